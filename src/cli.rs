use clap::Parser;
use std::path::PathBuf;

use crate::error::{GenError, Result};
use crate::generate::{expand_template_paths, GenerateRequest, DEFAULT_OUT_DIR};
use crate::models::{load_values, Cluster, RenderContext};
use crate::ports::PortList;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Render Kubernetes definition templates into gen/<cluster>/<namespace>/<name>/"
)]
pub struct Cli {
    /// Cluster where the definition will be deployed, as <provider>_<zone>
    #[clap(long, env = "KUBEGEN_CLUSTER")]
    pub cluster: Option<String>,

    /// Namespace where the definition will be deployed
    #[clap(long, env = "KUBEGEN_NAMESPACE")]
    pub namespace: Option<String>,

    /// Name of the resource that will be deployed
    #[clap(long, env = "KUBEGEN_NAME")]
    pub name: Option<String>,

    /// Docker image to deploy
    #[clap(long, env = "KUBEGEN_IMG", default_value = "")]
    pub img: String,

    /// Ports used by service definitions: port[:targetPort[:protocol]],...
    /// May be repeated.
    #[clap(long, value_name = "SPEC")]
    pub ports: Vec<String>,

    /// YAML file exposed to templates as `values`
    #[clap(long, value_name = "FILE")]
    pub values: Option<PathBuf>,

    /// Root directory for generated files
    #[clap(long, env = "KUBEGEN_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Increase logging verbosity (-v, -vv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Template files or glob patterns
    #[clap(value_name = "TEMPLATE")]
    pub templates: Vec<String>,
}

impl Cli {
    /// Validates the arguments into a generation request. Nothing is read
    /// from disk until the required parameters are known to be present.
    pub fn into_request(self) -> Result<GenerateRequest> {
        let cluster = required(self.cluster, "cluster")?;
        let namespace = required(self.namespace, "namespace")?;
        let name = required(self.name, "name")?;

        let mut context = RenderContext::new(Cluster::parse(&cluster)?, &namespace, &name);
        context.image = self.img;

        let mut ports = PortList::new();
        for spec in &self.ports {
            ports.extend_from_spec(spec)?;
        }
        context.ports = ports.into_vec();

        if let Some(path) = &self.values {
            context.values = load_values(path)?;
        }

        let templates = expand_template_paths(&self.templates)?;
        if templates.is_empty() {
            return Err(GenError::MissingTemplates);
        }

        Ok(GenerateRequest {
            context,
            templates,
            out_root: self.out_dir,
        })
    }
}

fn required(value: Option<String>, flag: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(GenError::MissingArgument(flag))
}
