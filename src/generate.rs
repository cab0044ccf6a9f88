use glob::glob;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{GenError, Result};
use crate::models::RenderContext;
use crate::templates::load_templates;

/// Default root under which generated files are written.
pub const DEFAULT_OUT_DIR: &str = "gen";

/// A validated generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub context: RenderContext,
    pub templates: Vec<PathBuf>,
    pub out_root: PathBuf,
}

impl GenerateRequest {
    /// `<out_root>/<cluster>/<namespace>/<name>`
    pub fn output_dir(&self) -> PathBuf {
        self.out_root
            .join(&self.context.cluster)
            .join(&self.context.namespace)
            .join(&self.context.name)
    }
}

/// Expands glob patterns among `args`; other arguments are kept as given.
pub fn expand_template_paths(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for arg in args {
        if !is_pattern(arg) {
            paths.push(PathBuf::from(arg));
            continue;
        }

        let matches: Vec<PathBuf> = glob(arg)
            .map_err(|source| GenError::Pattern {
                pattern: arg.clone(),
                source,
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        if matches.is_empty() {
            // `deploy[1].tmpl` is a file name, not a character class.
            let literal = PathBuf::from(arg);
            if literal.is_file() {
                paths.push(literal);
                continue;
            }
            warn!(pattern = %arg, "No template matched pattern");
        } else {
            debug!(pattern = %arg, count = matches.len(), "Expanded template pattern");
        }
        paths.extend(matches);
    }

    Ok(paths)
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Parses every template, then renders them one at a time into the output
/// directory. Returns the written paths in input order.
pub fn run(request: &GenerateRequest) -> Result<Vec<PathBuf>> {
    if request.templates.is_empty() {
        return Err(GenError::MissingTemplates);
    }

    let templates = load_templates(&request.templates, &request.context.name)?;

    let out_dir = request.output_dir();
    fs::create_dir_all(&out_dir)
        .map_err(|e| GenError::io("create output directory", &out_dir, e))?;

    let context = tera::Context::from_serialize(&request.context)
        .map_err(|source| GenError::Context { source })?;

    let mut written = Vec::with_capacity(templates.descriptors().len());
    for descriptor in templates.descriptors() {
        let out_path = out_dir.join(&descriptor.output_filename);
        // Rendered in memory so a failing template never leaves a partial file.
        let rendered = templates.render(descriptor, &context)?;
        remove_stale(&out_path)?;

        info!("Generating {}\t->\t{}", descriptor.template_name, out_path.display());

        let mut file =
            File::create(&out_path).map_err(|e| GenError::io("create", &out_path, e))?;
        file.write_all(rendered.as_bytes())
            .map_err(|e| GenError::io("write", &out_path, e))?;
        file.sync_all()
            .map_err(|e| GenError::io("sync", &out_path, e))?;

        written.push(out_path);
    }

    Ok(written)
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed previous output");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GenError::io("remove", path, e)),
    }
}
