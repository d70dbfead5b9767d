use super::*;
use pretty_assertions::assert_eq;
use shellbook_error::ErrorExt;
use shellbook_error::StatusCode;

fn ctx() -> ExecutionContext {
    ExecutionContext {
        identity: CellId::from("cell-7"),
        order: ExecutionOrder::next(),
        cwd: Some(PathBuf::from("/work")),
        raw_text: "echo {{ name }}".to_string(),
    }
}

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_identity_transform() {
    let out = IdentityTransform.transform("ls -la", &ctx()).unwrap();
    assert_eq!(out, "ls -la");
}

#[test]
fn test_template_substitutes_variables() {
    let transform = TemplateTransform::new(vars(&[("name", "world")]));
    let out = transform.transform("echo hello {{ name }}", &ctx()).unwrap();
    assert_eq!(out, "echo hello world");
}

#[test]
fn test_template_builtins() {
    let transform = TemplateTransform::default();
    let context = ctx();
    let out = transform
        .transform("echo {{ cell }} {{ order }} {{ cwd }}", &context)
        .unwrap();
    assert_eq!(out, format!("echo cell-7 {} /work", context.order));
}

#[test]
fn test_template_env_lookup() {
    let transform = TemplateTransform::default();
    let is_identifier = |k: &str| {
        k.starts_with(|c: char| c.is_ascii_alphabetic())
            && k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let Some((key, value)) = std::env::vars().find(|(k, _)| is_identifier(k)) else {
        return;
    };
    let out = transform
        .transform(&format!("echo {{{{ env.{key} }}}}"), &ctx())
        .unwrap();
    assert_eq!(out, format!("echo {value}"));
}

#[test]
fn test_undefined_variable_fails() {
    let transform = TemplateTransform::default();
    let err = transform
        .transform("echo {{ missing }}", &ctx())
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::TransformFailed);
    assert!(err.to_string().starts_with("Template error:"), "{err}");
}

#[test]
fn test_syntax_error_fails() {
    let transform = TemplateTransform::default();
    assert!(transform.transform("echo {{ unclosed", &ctx()).is_err());
}

#[test]
fn test_plain_shell_syntax_passes_through() {
    let transform = TemplateTransform::default();
    let command = "echo ${#HOME} {a,b}";
    assert_eq!(transform.transform(command, &ctx()).unwrap(), command);
}

#[test]
fn test_no_html_escaping() {
    let transform = TemplateTransform::new(vars(&[("op", "a && b < c")]));
    let out = transform.transform("{{ op }}", &ctx()).unwrap();
    assert_eq!(out, "a && b < c");
}
