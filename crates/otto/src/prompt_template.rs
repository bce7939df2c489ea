use include_dir::{include_dir, Dir};
use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

static PROMPTS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

pub fn render_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the templates embedded under `src/prompts`.
pub fn render_prompt_file<T: Serialize>(
    template_file: &str,
    context_data: &T,
) -> Result<String, TeraError> {
    let file = PROMPTS_DIR
        .get_file(template_file)
        .ok_or_else(|| TeraError::msg(format!("unknown prompt template: {}", template_file)))?;
    let template = file
        .contents_utf8()
        .ok_or_else(|| TeraError::msg(format!("prompt template is not utf-8: {}", template_file)))?;
    render_prompt(template, context_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_prompt() {
        let template = "Hello, {{ name }}! You are {{ age }} years old.";
        let mut context = HashMap::new();
        context.insert("name".to_string(), "Alice".to_string());
        context.insert("age".to_string(), 30.to_string());

        let result = render_prompt(template, &context).unwrap();
        assert_eq!(result, "Hello, Alice! You are 30 years old.");
    }

    #[test]
    fn test_render_prompt_missing_variable() {
        let template = "Hello, {{ name }}!";
        let context: HashMap<String, String> = HashMap::new();
        let result = render_prompt(template, &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_prompt_file_unknown_template() {
        let context: HashMap<String, String> = HashMap::new();
        let result = render_prompt_file("no_such_template.md", &context);
        assert!(result.is_err());
    }

    #[test]
    fn test_system_template_renders_tool_list() {
        #[derive(serde::Serialize)]
        struct ToolContext {
            signature: String,
            description: String,
        }

        #[derive(serde::Serialize)]
        struct SystemContext {
            tools: Vec<ToolContext>,
            operating_system: String,
            working_dir: String,
            file_list: String,
        }

        let context = SystemContext {
            tools: vec![ToolContext {
                signature: "read_file(path)".to_string(),
                description: "Read the contents of a text file".to_string(),
            }],
            operating_system: "linux".to_string(),
            working_dir: "/tmp/project".to_string(),
            file_list: "/tmp/project/readme.md".to_string(),
        };

        let rendered = render_prompt_file("system.md", &context).unwrap();
        assert!(rendered.contains("read_file(path): Read the contents of a text file"));
        assert!(rendered.contains("/tmp/project"));
        assert!(rendered.contains("<final_answer>"));
    }
}
