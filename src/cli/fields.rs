// ABOUTME: CLI fields command - print the assessment field catalogue by step

use anyhow::Result;
use serde::Serialize;

use super::util::print_json;
use super::OutputFormat;
use crate::components::assessment::{FieldDefinition, FieldName, STEP_GROUPS, STEP_TITLES};

#[derive(Debug, Serialize)]
struct FieldInfo {
    name: FieldName,
    label: &'static str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<OptionInfo>,
}

#[derive(Debug, Serialize)]
struct OptionInfo {
    code: u8,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct StepInfo {
    step: usize,
    title: &'static str,
    fields: Vec<FieldInfo>,
}

fn catalogue() -> Vec<StepInfo> {
    STEP_GROUPS
        .iter()
        .zip(STEP_TITLES.iter().copied())
        .enumerate()
        .map(|(idx, (group, title))| StepInfo {
            step: idx + 1,
            title,
            fields: group.iter().map(|field| field_info(*field)).collect(),
        })
        .collect()
}

fn field_info(field: FieldName) -> FieldInfo {
    match field.definition() {
        FieldDefinition::Numeric { label, unit, help, .. } => FieldInfo {
            name: field,
            label: *label,
            kind: "number",
            unit: *unit,
            help: *help,
            options: Vec::new(),
        },
        FieldDefinition::Choice { label, options } => FieldInfo {
            name: field,
            label: *label,
            kind: "choice",
            unit: None,
            help: None,
            options: options
                .iter()
                .map(|o| OptionInfo {
                    code: o.code,
                    label: o.label,
                })
                .collect(),
        },
    }
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let steps = catalogue();
    match format {
        OutputFormat::Json => print_json(&steps),
        OutputFormat::Text => {
            for step in &steps {
                println!("Step {}: {}", step.step, step.title);
                for field in &step.fields {
                    let unit = field.unit.map(|u| format!(" ({})", u)).unwrap_or_default();
                    println!("  {:<10} {}{}", field.name.as_str(), field.label, unit);
                    for option in &field.options {
                        println!("  {:<10}   {} = {}", "", option.code, option.label);
                    }
                }
                println!();
            }
            Ok(())
        }
    }
}
