use std::path::PathBuf;

use colored::Colorize;

use crate::config::Settings;
use crate::error::{OnboardError, OnboardResult};
use crate::excel::{TemplateWriter, Workbook};
use crate::pipeline::{Pipeline, SheetRows};
use crate::remote::PlatformClient;
use crate::types::Entity;

fn pipeline_for(entities: &[Entity], include_hierarchy: bool) -> Pipeline {
    let pipeline = if entities.is_empty() {
        Pipeline::new()
    } else {
        Pipeline::with_steps(entities)
    };
    if include_hierarchy {
        pipeline.include_hierarchy(true)
    } else {
        pipeline
    }
}

fn print_line(line: &str) {
    if line.starts_with("Error") {
        println!("{}", line.red());
    } else if line.starts_with("Created") || line.starts_with("Updated") {
        println!("{}", line.green());
    } else if line.contains("skipped") {
        println!("{}", line.yellow());
    } else {
        println!("{}", line);
    }
}

/// Execute the run command
pub fn run(
    workbook: PathBuf,
    settings: Settings,
    entities: Vec<Entity>,
    include_hierarchy: bool,
) -> OnboardResult<()> {
    println!("{}", "🚚 Onboard - Workbook Migration".bold().green());
    println!("   Workbook: {}", workbook.display());
    println!("   Platform: {}", settings.platform.base_url);
    println!("   Project:  {}\n", settings.platform.project_id);

    let pipeline = pipeline_for(&entities, include_hierarchy);
    let steps: Vec<String> = pipeline.steps().iter().map(|e| e.key().to_string()).collect();
    println!("   Steps: {}\n", steps.join(" → ").cyan());

    let source = Workbook::open(&workbook)?;
    let client = PlatformClient::connect(&settings)?;
    let outcome = pipeline.run(&source, &client);

    for line in &outcome.messages {
        print_line(line);
    }
    println!();

    if !outcome.success {
        println!("{}", "❌ Migration stopped".bold().red());
        let last = outcome.messages.last().cloned().unwrap_or_default();
        return Err(OnboardError::Migration(last));
    }

    println!("{}", "✅ Migration Complete!".bold().green());
    println!("   Created: {} record(s)\n", outcome.created_count());
    Ok(())
}

/// Execute the inspect command
pub fn inspect(
    workbook: PathBuf,
    entities: Vec<Entity>,
    include_hierarchy: bool,
    verbose: bool,
) -> OnboardResult<()> {
    println!("{}", "🔍 Onboard - Workbook Inspection".bold().green());
    println!("   Workbook: {}\n", workbook.display());

    let source = Workbook::open(&workbook)?;
    if verbose {
        println!("   Sheets: {}\n", source.sheet_names().join(", "));
    }

    let pipeline = pipeline_for(&entities, include_hierarchy);
    for entity in pipeline.steps() {
        match SheetRows::load(*entity, &source) {
            Ok(rows) => {
                println!("   📋 {}: {} record(s)", entity.label().bright_blue(), rows.len());
                if verbose {
                    for name in rows.names() {
                        println!("      - {}", name);
                    }
                }
            }
            Err(e) => {
                println!("\n{}", format!("❌ {}: {}", entity.label(), e).bold().red());
                return Err(e);
            }
        }
    }

    println!("\n{}", "✅ Workbook is valid".bold().green());
    Ok(())
}

/// Execute the template command
pub fn template(output: PathBuf) -> OnboardResult<()> {
    println!("{}", "📝 Onboard - Workbook Template".bold().green());

    TemplateWriter::new().save(&output)?;

    println!("{}", "✅ Template written".bold().green());
    println!("   File: {}", output.display());
    for entity in Entity::ALL {
        println!("   ✅ {}", entity.sheet_name());
    }
    println!();
    Ok(())
}

/// Execute the config command
pub fn config(settings: Settings) -> OnboardResult<()> {
    println!("{}", "⚙️  Onboard - Effective Settings".bold().green());
    let shown = serde_yaml::to_string(&settings.masked())?;
    println!("{}", shown);

    match settings.validate() {
        Ok(()) => println!("{}", "✅ Settings are complete".green()),
        Err(e) => println!("{}", format!("⚠️  {}", e).yellow()),
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
