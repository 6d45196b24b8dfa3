use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl From<crate::cli::OutputFormat> for OutputFormat {
    fn from(format: crate::cli::OutputFormat) -> Self {
        match format {
            crate::cli::OutputFormat::Yaml => OutputFormat::Yaml,
            crate::cli::OutputFormat::Auto | crate::cli::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    let json_value = serde_json::to_value(data)?;
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&json_value)?,
    };
    Ok(rendered.trim_end().to_string())
}

pub fn print_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    println!("{}", render(data, format)?);
    Ok(())
}
