//! Template loading.
//!
//! Each template file is parsed into a shared [`Tera`] instance under its
//! path. The output filename is the file's base name with the `.tmpl`
//! suffix removed, unless the first line is a directive:
//!
//! ```text
//! ///custom-%s.yaml
//! kind: Service
//! metadata:
//!   name: {{ name }}
//! ```
//!
//! The directive line is dropped from the body and `%s` is replaced with
//! the resource name.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tera::{Context, Tera, Value};
use tracing::debug;

use crate::error::{GenError, Result};

/// Removed (once) from a template's base name to get its output filename.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Prefix of a first line that overrides the output filename.
pub const DIRECTIVE_MARKER: &str = "///";

/// Where a parsed template is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub output_filename: String,
    pub template_name: String,
}

/// Parsed templates, in input order, ready to render.
pub struct TemplateSet {
    tera: Tera,
    descriptors: Vec<TemplateDescriptor>,
}

impl TemplateSet {
    pub fn descriptors(&self) -> &[TemplateDescriptor] {
        &self.descriptors
    }

    pub fn render(&self, descriptor: &TemplateDescriptor, context: &Context) -> Result<String> {
        self.tera
            .render(&descriptor.template_name, context)
            .map_err(|source| GenError::Render {
                name: descriptor.template_name.clone(),
                source,
            })
    }
}

/// Loads every template in order, stopping at the first failure.
pub fn load_templates<P: AsRef<Path>>(paths: &[P], name: &str) -> Result<TemplateSet> {
    let mut tera = new_engine();
    let mut descriptors = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let contents = read_template(path)?;
        let (output_filename, body) = match split_directive(&contents) {
            Some((format, body)) => (format_directive(format, name), body),
            None => (default_output_filename(path)?, contents.as_str()),
        };
        check_output_filename(path, &output_filename)?;

        let template_name = path.display().to_string();
        tera.add_raw_template(&template_name, body)
            .map_err(|source| GenError::TemplateParse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(template = %template_name, output = %output_filename, "Parsed template");
        descriptors.push(TemplateDescriptor {
            output_filename,
            template_name,
        });
    }

    Ok(TemplateSet { tera, descriptors })
}

fn new_engine() -> Tera {
    let mut tera = Tera::default();
    // Output is YAML and friends, never HTML.
    tera.autoescape_on(vec![]);
    tera.register_function("firstRune", first_rune_function);
    tera.register_filter("firstRune", first_rune_filter);
    tera
}

fn read_template(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| GenError::io("open template", path, e))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| GenError::io("read template", path, e))?;

    Ok(contents)
}

/// Base name of `path` with the first occurrence of [`TEMPLATE_SUFFIX`] removed.
pub fn default_output_filename(path: &Path) -> Result<String> {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .ok_or_else(|| GenError::InvalidOutputFilename {
            path: path.to_path_buf(),
            filename: String::new(),
        })?;

    Ok(base.replacen(TEMPLATE_SUFFIX, "", 1))
}

/// Splits off a directive first line. Returns the directive's format string
/// and the remaining body, or `None` when the file has no directive.
pub fn split_directive(contents: &str) -> Option<(&str, &str)> {
    let rest = contents.strip_prefix(DIRECTIVE_MARKER)?;
    let (line, body) = rest.split_once('\n').unwrap_or((rest, ""));
    Some((line.strip_suffix('\r').unwrap_or(line), body))
}

/// Fills the directive's `%s` slot with `name`; `%%` is a literal `%`.
pub fn format_directive(format: &str, name: &str) -> String {
    let mut out = String::with_capacity(format.len() + name.len());
    let mut substituted = false;
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') if !substituted => {
                chars.next();
                out.push_str(name);
                substituted = true;
            }
            _ => out.push('%'),
        }
    }

    out
}

fn check_output_filename(path: &Path, filename: &str) -> Result<()> {
    if filename.is_empty() || filename == "." || filename == ".." || filename.contains(['/', '\\']) {
        return Err(GenError::InvalidOutputFilename {
            path: PathBuf::from(path),
            filename: filename.to_string(),
        });
    }
    Ok(())
}

/// First Unicode scalar value of `s`, or an empty string.
pub fn first_rune(s: &str) -> String {
    s.chars().next().map(String::from).unwrap_or_default()
}

fn first_rune_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    match args.get("s") {
        Some(value) => first_rune_value(value),
        None => Err(tera::Error::msg(
            "Function `firstRune` was called without the `s` argument",
        )),
    }
}

fn first_rune_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    first_rune_value(value)
}

fn first_rune_value(value: &Value) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("`firstRune` expects a string, got {value}")))?;
    Ok(Value::String(first_rune(s)))
}
