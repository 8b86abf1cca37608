// ABOUTME: CLI predict command - run the assessment wizard non-interactively
//
// Walks the same StepFormController the TUI uses, one step at a time, then submits
// and prints the result banner and nearby hospitals.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use super::util::{print_json, resolve_location, CommandContext};
use super::{OutputFormat, PredictArgs};
use crate::api::Hospital;
use crate::components::assessment::{
    FieldDefinition, FieldName, FieldValue, PredictionOutcome, StepFormController,
};

#[derive(Debug, Serialize)]
struct PredictReport<'a> {
    message: &'a str,
    banner: &'static str,
    has_risk: bool,
    defaulted: Vec<FieldName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hospitals: Option<&'a [Hospital]>,
}

pub async fn execute(args: PredictArgs, format: OutputFormat) -> Result<()> {
    let assignments = parse_assignments(&args.values)?;
    let mut controller = fill_controller(&assignments)?;

    let ctx = CommandContext::load()?;
    ctx.require_login()?;

    let defaulted = controller.normalize()?.defaulted().to_vec();
    let outcome: PredictionOutcome = controller.submit(&ctx.client).await.context("Prediction failed")?;

    let hospitals = match resolve_location(&args.location, &ctx.config) {
        Some(location) => Some(
            ctx.client
                .nearby_hospitals(location)
                .await
                .context("Hospital lookup failed")?,
        ),
        None => None,
    };

    let banner = outcome.banner();
    let report = PredictReport {
        message: &outcome.message,
        banner: banner.title(),
        has_risk: banner.has_risk(),
        defaulted,
        hospitals: hospitals.as_deref(),
    };

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            output_text(&report);
            Ok(())
        }
    }
}

/// Parse repeated `name=value` flags; later assignments win
pub fn parse_assignments(raw: &[String]) -> Result<BTreeMap<FieldName, String>> {
    let mut assignments = BTreeMap::new();
    for item in raw {
        let (name, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected FIELD=VALUE, got '{}'", item))?;
        let field: FieldName = name.parse().map_err(|e: String| anyhow!(e))?;
        assignments.insert(field, value.trim().to_string());
    }
    Ok(assignments)
}

/// Drive a fresh controller through every step, entering each step's values
pub fn fill_controller(assignments: &BTreeMap<FieldName, String>) -> Result<StepFormController> {
    let mut controller = StepFormController::new();

    loop {
        for field in controller.current_fields() {
            if let Some(raw) = assignments.get(field) {
                let value = field_value(*field, raw)?;
                controller.set_field_value(*field, value)?;
            }
        }
        if controller.is_final_step() {
            break;
        }
        controller.next_step()?;
    }

    Ok(controller)
}

/// Numeric fields take the text as typed; choice fields take an option code or label
fn field_value(field: FieldName, raw: &str) -> Result<FieldValue> {
    match field.definition() {
        FieldDefinition::Numeric { .. } => Ok(FieldValue::text(raw)),
        FieldDefinition::Choice { options, .. } => {
            let by_code = raw
                .parse::<u8>()
                .ok()
                .and_then(|code| options.iter().find(|o| o.code == code));
            let by_label = || options.iter().find(|o| o.label.eq_ignore_ascii_case(raw));

            by_code
                .or_else(by_label)
                .map(|option| FieldValue::Code(option.code))
                .ok_or_else(|| {
                    let valid: Vec<String> = options.iter().map(|o| format!("{} ({})", o.code, o.label)).collect();
                    anyhow!("Invalid value '{}' for {}; expected one of: {}", raw, field, valid.join(", "))
                })
        }
    }
}

fn output_text(report: &PredictReport) {
    println!("{}", report.banner);
    println!("{}", report.message);

    if !report.defaulted.is_empty() {
        let names: Vec<&str> = report.defaulted.iter().map(FieldName::as_str).collect();
        println!();
        println!("Note: unanswered fields sent as 0: {}", names.join(", "));
    }

    let Some(hospitals) = report.hospitals else {
        return;
    };

    println!();
    if report.has_risk {
        println!("Recommended Cardiac Centers");
        println!("⚠️ Please consult a cardiologist within the next 48 hours");
    } else {
        println!("Cardiac Health Resources");
        println!("✅ Regular checkups help maintain heart health");
    }

    if hospitals.is_empty() {
        println!("No cardiac centres found nearby.");
        return;
    }
    for hospital in hospitals {
        println!();
        println!("  {}", hospital.name);
        println!("    {}", hospital.vicinity);
        if let Some(rating) = hospital.rating {
            println!(
                "    ★ {:.1} ({} reviews)",
                rating,
                hospital.user_ratings_total.unwrap_or_default()
            );
        }
        if let Some(open) = hospital.is_open_now() {
            println!("    {}", if open { "Open now" } else { "Closed" });
        }
        println!("    {}", hospital.directions_url());
    }
}
