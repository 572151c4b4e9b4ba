use super::registry::{AdminTool, ToolError, ToolPlan, default_true, parse_params, require_non_empty};
use crate::exec::CommandDescriptor;
use crate::system::SystemInfo;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Filters {
    #[serde(default)]
    extensions: Vec<String>,
    age_in_days: Option<u32>,
    size_limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CleanupParams {
    target: String,
    #[serde(default)]
    recursive: bool,
    #[serde(default = "default_true")]
    dry_run: bool,
    #[serde(default)]
    filters: Filters,
}

/// Convert a human size such as `1MB`, `500k` or `2G` into a `find -size` operand.
///
/// Plain numbers are bytes.
pub fn find_size_operand(limit: &str) -> Result<String, ToolError> {
    let invalid = || ToolError::InvalidArgument(format!("invalid size limit: {limit:?}"));

    let trimmed = limit.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(digits_end);
    let number: u64 = number.parse().map_err(|_| invalid())?;

    let unit = unit.trim().to_ascii_uppercase();
    let suffix = match unit.strip_suffix('B').unwrap_or(&unit) {
        "" => "c",
        "K" => "k",
        "M" => "M",
        "G" => "G",
        _ => return Err(invalid()),
    };

    Ok(format!("+{number}{suffix}"))
}

fn extension_pattern(extension: &str) -> Result<String, ToolError> {
    let ext = extension.trim().trim_start_matches('.');
    let valid = !ext.is_empty()
        && ext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(ToolError::InvalidArgument(format!(
            "invalid extension: {extension:?}"
        )));
    }
    Ok(format!("*.{ext}"))
}

/// `find` argument vector for a cleanup request
fn find_args(params: &CleanupParams) -> Result<Vec<String>, ToolError> {
    let mut args = vec![params.target.clone()];

    if !params.recursive {
        args.extend(["-maxdepth".to_string(), "1".to_string()]);
    }
    args.extend(["-type".to_string(), "f".to_string()]);

    let patterns = params
        .filters
        .extensions
        .iter()
        .map(|ext| extension_pattern(ext))
        .collect::<Result<Vec<_>, _>>()?;
    match patterns.as_slice() {
        [] => {}
        [single] => args.extend(["-name".to_string(), single.clone()]),
        many => {
            args.push("(".to_string());
            for (i, pattern) in many.iter().enumerate() {
                if i > 0 {
                    args.push("-o".to_string());
                }
                args.extend(["-name".to_string(), pattern.clone()]);
            }
            args.push(")".to_string());
        }
    }

    if let Some(days) = params.filters.age_in_days {
        args.extend(["-mtime".to_string(), format!("+{days}")]);
    }

    if let Some(limit) = &params.filters.size_limit {
        args.extend(["-size".to_string(), find_size_operand(limit)?]);
    }

    args.push(if params.dry_run { "-print" } else { "-delete" }.to_string());
    Ok(args)
}

/// `cleanup_files`: a `find` invocation that lists, or deletes, matching files
pub struct CleanupFilesTool;

impl AdminTool for CleanupFilesTool {
    fn name(&self) -> &'static str {
        "cleanup_files"
    }

    fn description(&self) -> &'static str {
        "Clean up files and directories with safety validation"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "target": {
                    "type": "string",
                    "description": "Target directory or file to clean up"
                },
                "recursive": {
                    "type": "boolean",
                    "default": false,
                    "description": "Process directories recursively"
                },
                "dryRun": {
                    "type": "boolean",
                    "default": true,
                    "description": "Show what would be done without actually doing it"
                },
                "filters": {
                    "type": "object",
                    "properties": {
                        "extensions": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "File extensions to target (e.g., [\"tmp\", \"log\"])"
                        },
                        "ageInDays": {
                            "type": "number",
                            "description": "Only process files older than this many days"
                        },
                        "sizeLimit": {
                            "type": "string",
                            "description": "Only process files larger than this size (e.g., \"1MB\")"
                        }
                    }
                }
            },
            "required": ["target"]
        })
    }

    fn plan(&self, params: Value, _system: &SystemInfo) -> Result<ToolPlan, ToolError> {
        let params: CleanupParams = parse_params(self.name(), params)?;
        require_non_empty("target", &params.target)?;
        if params.target.starts_with('-') {
            return Err(ToolError::InvalidArgument(format!(
                "invalid target: {:?}",
                params.target
            )));
        }

        let description = if params.dry_run {
            format!("List cleanup candidates in: {}", params.target)
        } else {
            format!("Clean up files in: {}", params.target)
        };
        let command = CommandDescriptor::new("find", find_args(&params)?).with_description(description);

        // A dry run still executes: listing with -print is the preview.
        // `find -delete` classifies as safe, so deletion is flagged on the plan.
        Ok(ToolPlan::new(self.name(), vec![command])
            .with_destructive(!params.dry_run)
            .with_details(json!({
                "target": params.target,
                "recursive": params.recursive,
                "dryRun": params.dry_run,
            })))
    }
}
