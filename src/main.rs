//! form-for - replay a nested form scenario
//!
//! Reads a JSON scenario describing a tree of forms, applies the edits it
//! lists, submits the root form and reports what was persisted.
//!
//! ```json
//! {
//!   "name": "Order",
//!   "values": { "reference": "A-1" },
//!   "edits": { "reference": "A-2" },
//!   "children": [{ "name": "LineItem", "values": { "qty": 1 }, "new": true }]
//! }
//! ```

use anyhow::{bail, Context, Result};
use form_for::{
    FormForConfig, FormId, FormOptions, Forms, MemoryModel, Services, TrackedField, Values,
};
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    #[serde(default)]
    values: Values,
    #[serde(default)]
    edits: Values,
    #[serde(default)]
    new: bool,
    #[serde(default)]
    children: Vec<Scenario>,
}

struct Built {
    id: FormId,
    name: String,
    model: Rc<MemoryModel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "form_for=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: form-for <scenario.json>");
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    let config = FormForConfig::load()?;

    LocalSet::new().run_until(replay(scenario, config)).await
}

async fn replay(scenario: Scenario, config: FormForConfig) -> Result<()> {
    let forms = Forms::new(config, Services::default());
    let mut built = Vec::new();
    let root = build(&forms, &scenario, None, &mut built)?;

    apply_edits(&forms, &scenario, &built)?;
    forms.settle().await;
    tracing::info!(
        "{} forms, root dirty={}, navigation blocked={}",
        forms.len(),
        forms.is_dirty(root),
        forms.should_prevent_navigation()
    );

    let outcome = forms.submit(root).await;
    forms.settle().await;
    match &outcome {
        Ok(outcome) => tracing::info!("Root submit: {outcome:?}"),
        Err(err) => tracing::warn!("Root submit failed: {err}"),
    }

    for form in &built {
        println!(
            "{} ({}): dirty={} committed={}",
            form.name,
            forms.model_name(form.id),
            forms.is_dirty(form.id),
            serde_json::Value::Object(form.model.committed())
        );
    }

    forms.destroy_form(root);
    forms.settle().await;
    Ok(())
}

/// Create the form tree depth first, one tracked field per initial value
fn build(
    forms: &Forms,
    scenario: &Scenario,
    parent: Option<FormId>,
    built: &mut Vec<Built>,
) -> Result<FormId> {
    let mut model = MemoryModel::new(&scenario.name, scenario.values.clone());
    if scenario.new {
        model = model.new_record();
    }
    let model = Rc::new(model);

    let mut options = FormOptions::new(model.clone());
    if let Some(parent) = parent {
        options = options.parent(parent);
    }
    let id = forms.create_form(options)?;
    let edited_only = scenario
        .edits
        .keys()
        .filter(|key| !scenario.values.contains_key(*key));
    for key in scenario.values.keys().chain(edited_only) {
        let field = TrackedField::new(model.clone(), key, key);
        forms.register_field(id, Rc::new(field))?;
    }
    built.push(Built {
        id,
        name: scenario.name.clone(),
        model,
    });

    for child in &scenario.children {
        build(forms, child, Some(id), built)?;
    }
    Ok(id)
}

/// Edits are applied in the same depth-first order the tree was built in
fn apply_edits(forms: &Forms, scenario: &Scenario, built: &[Built]) -> Result<()> {
    let mut pending = vec![scenario];
    let mut index = 0;
    while let Some(node) = pending.pop() {
        let form = built
            .get(index)
            .context("scenario tree changed while replaying")?;
        index += 1;
        if !node.edits.is_empty() {
            tracing::debug!("Editing {} with {} values", form.name, node.edits.len());
            forms.update_values(form.id, node.edits.clone())?;
        }
        pending.extend(node.children.iter().rev());
    }
    Ok(())
}
