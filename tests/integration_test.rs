use kubegen::generate::{run, GenerateRequest};
use kubegen::models::{Cluster, RenderContext};
use kubegen::ports::PortList;
use kubegen::GenError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn request(dir: &Path, templates: Vec<PathBuf>) -> GenerateRequest {
    let mut context =
        RenderContext::new(Cluster::parse("aws_eu-west-1").unwrap(), "payments", "svc");
    context.image = "payments/api:v1.2.0".to_string();
    context.ports = "80:8080,9090:9090:UDP".parse::<PortList>().unwrap().into_vec();

    GenerateRequest {
        context,
        templates,
        out_root: dir.join("gen"),
    }
}

// Helper function to create the test templates
fn create_test_templates(dir: &Path) -> Vec<PathBuf> {
    let deployment_path = dir.join("deployment.yaml.tmpl");
    fs::write(
        &deployment_path,
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ name }}
  namespace: {{ namespace }}
  labels:
    provider: {{ cluster_provider }}
    zone: {{ cluster_zone }}
spec:
  template:
    spec:
      containers:
        - name: {{ name }}
          image: {{ image }}
          ports:
{%- for p in ports %}
            - containerPort: {{ p.target_port }}
{%- endfor %}
"#,
    )
    .unwrap();

    let service_path = dir.join("service.yaml.tmpl");
    fs::write(
        &service_path,
        r#"///%s-service.yaml
apiVersion: v1
kind: Service
metadata:
  name: {{ name }}
spec:
  ports:
{%- for p in ports %}
    - port: {{ p.port }}
      targetPort: {{ p.target_port }}
      protocol: {{ p.protocol }}
{%- endfor %}
"#,
    )
    .unwrap();

    vec![deployment_path, service_path]
}

#[test]
fn test_generate_workflow() {
    let temp_dir = tempdir().unwrap();
    let templates = create_test_templates(temp_dir.path());
    let request = request(temp_dir.path(), templates);

    let written = run(&request).unwrap();

    let out_dir = temp_dir.path().join("gen/aws_eu-west-1/payments/svc");
    assert_eq!(
        written,
        vec![
            out_dir.join("deployment.yaml"),
            out_dir.join("svc-service.yaml")
        ]
    );

    let deployment = fs::read_to_string(out_dir.join("deployment.yaml")).unwrap();
    assert!(deployment.contains("kind: Deployment"));
    assert!(deployment.contains("name: svc"));
    assert!(deployment.contains("namespace: payments"));
    assert!(deployment.contains("provider: aws"));
    assert!(deployment.contains("zone: eu-west-1"));
    assert!(deployment.contains("image: payments/api:v1.2.0"));
    assert!(deployment.contains("containerPort: 8080"));
    assert!(deployment.contains("containerPort: 9090"));

    let service = fs::read_to_string(out_dir.join("svc-service.yaml")).unwrap();
    assert!(service.starts_with("apiVersion: v1"));
    assert!(!service.contains("///"));
    assert!(service.contains("port: 80"));
    assert!(service.contains("protocol: TCP"));
    assert!(service.contains("protocol: UDP"));
}

#[test]
fn test_stale_output_is_overwritten() {
    let temp_dir = tempdir().unwrap();
    let template = temp_dir.path().join("config.txt.tmpl");
    fs::write(&template, "short {{ name }}").unwrap();

    let request = request(temp_dir.path(), vec![template]);
    let out_path = request.output_dir().join("config.txt");

    fs::create_dir_all(request.output_dir()).unwrap();
    fs::write(&out_path, "a much longer stale file that must disappear\n").unwrap();

    run(&request).unwrap();
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "short svc");

    // Running again yields the same content
    run(&request).unwrap();
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "short svc");
}

#[test]
fn test_parse_failure_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let good = temp_dir.path().join("good.yaml.tmpl");
    let bad = temp_dir.path().join("bad.yaml.tmpl");
    fs::write(&good, "{{ name }}").unwrap();
    fs::write(&bad, "{% if %}").unwrap();

    let request = request(temp_dir.path(), vec![good, bad]);
    let result = run(&request);

    assert!(matches!(result, Err(GenError::TemplateParse { .. })));
    assert!(!request.output_dir().join("good.yaml").exists());
}

#[test]
fn test_render_failure_stops_the_run() {
    let temp_dir = tempdir().unwrap();
    let first = temp_dir.path().join("first.yaml.tmpl");
    let broken = temp_dir.path().join("broken.yaml.tmpl");
    let last = temp_dir.path().join("last.yaml.tmpl");
    fs::write(&first, "{{ name }}").unwrap();
    fs::write(&broken, "{{ undefined_value }}").unwrap();
    fs::write(&last, "{{ name }}").unwrap();

    let request = request(temp_dir.path(), vec![first, broken, last]);
    let result = run(&request);

    assert!(matches!(result, Err(GenError::Render { .. })));
    assert!(request.output_dir().join("first.yaml").exists());
    assert!(!request.output_dir().join("broken.yaml").exists());
    assert!(!request.output_dir().join("last.yaml").exists());
}

#[test]
fn test_render_failure_keeps_previous_output() {
    let temp_dir = tempdir().unwrap();
    let broken = temp_dir.path().join("broken.yaml.tmpl");
    fs::write(&broken, "{{ undefined_value }}").unwrap();

    let request = request(temp_dir.path(), vec![broken]);
    let out_path = request.output_dir().join("broken.yaml");
    fs::create_dir_all(request.output_dir()).unwrap();
    fs::write(&out_path, "previous\n").unwrap();

    assert!(matches!(run(&request), Err(GenError::Render { .. })));
    assert_eq!(fs::read_to_string(&out_path).unwrap(), "previous\n");
}

#[test]
fn test_unremovable_output_is_fatal() {
    let temp_dir = tempdir().unwrap();
    let template = temp_dir.path().join("x.yaml.tmpl");
    fs::write(&template, "{{ name }}").unwrap();

    let request = request(temp_dir.path(), vec![template]);
    // A directory cannot be removed with remove_file
    fs::create_dir_all(request.output_dir().join("x.yaml")).unwrap();

    match run(&request) {
        Err(GenError::Io { action, path, .. }) => {
            assert_eq!(action, "remove");
            assert_eq!(path, request.output_dir().join("x.yaml"));
        }
        other => panic!("Expected Io remove error, got {:?}", other),
    }
    assert!(request.output_dir().join("x.yaml").is_dir());
}

#[test]
fn test_unserializable_values_fail_context() {
    let temp_dir = tempdir().unwrap();
    let template = temp_dir.path().join("x.yaml.tmpl");
    fs::write(&template, "{{ name }}").unwrap();

    let mut request = request(temp_dir.path(), vec![template]);
    // Sequence keys have no string form
    request.context.values = serde_yaml::from_str("? [a, b]\n: x\n").unwrap();

    assert!(matches!(run(&request), Err(GenError::Context { .. })));
    assert!(!request.output_dir().join("x.yaml").exists());
}

#[test]
fn test_values_are_exposed() {
    let temp_dir = tempdir().unwrap();
    let template = temp_dir.path().join("values.yaml.tmpl");
    fs::write(&template, "replicas: {{ values.replicas }}").unwrap();

    let mut request = request(temp_dir.path(), vec![template]);
    request.context.values = serde_yaml::from_str("replicas: 4").unwrap();

    let written = run(&request).unwrap();
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), "replicas: 4");
}

#[test]
fn test_no_templates() {
    let temp_dir = tempdir().unwrap();
    let request = request(temp_dir.path(), Vec::new());

    assert!(matches!(run(&request), Err(GenError::MissingTemplates)));
    assert!(!request.output_dir().exists());
}
