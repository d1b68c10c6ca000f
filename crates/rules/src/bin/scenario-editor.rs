//! scenario-editor: inspect and edit scenario formulas from the command line.
//!
//! Subcommands:
//! - `validate`: run the local validator and print errors per node path
//! - `check`: load a documents directory and validate every scenario in it
//! - `options`: list operand candidates for the node at a path
//! - `describe`: print every node with its label and validation errors
//! - `remove`: remove a node and write the scenario back

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use scenario_core::Config;
use scenario_rules::editable::{EditableAstNode, EditableNode};
use scenario_rules::loader::{DocumentStore, LoadStatus};
use scenario_rules::operand::{OperandContext, OperandOptions};
use scenario_rules::schema::{DataModelDocument, Document, ScenarioDocument};
use scenario_rules::session::{EditSession, MergeOutcome, ValidationWorker};
use scenario_rules::tree::ViewTree;
use scenario_rules::validation::{validate_scenario, LocalValidator};
use scenario_rules::SchemaContext;

// ── CLI ─────────────────────────────────────────────────────────────

/// Scenario formula editor.
#[derive(Parser, Debug)]
#[command(name = "scenario-editor", version, about)]
struct Cli {
    /// Configuration profile; keys are looked up as `{PROFILE}_{KEY}` first.
    #[arg(long, global = true, env = "SCENARIO_PROFILE")]
    profile: Option<String>,

    /// Data model document (tables, links, custom lists). Defaults to the configured path.
    #[arg(long, global = true)]
    data_model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a scenario against the data model.
    Validate { scenario: PathBuf },

    /// Validate every scenario under a documents directory.
    Check {
        /// Defaults to the configured documents directory.
        dir: Option<PathBuf>,
    },

    /// List operand candidates for the node at `--path`.
    Options {
        scenario: PathBuf,
        /// Dotted node path; numeric segments are positional children.
        #[arg(long, default_value = "")]
        path: String,
        /// Only show candidates whose name contains this text.
        #[arg(long)]
        query: Option<String>,
    },

    /// Describe every node of the formula.
    Describe { scenario: PathBuf },

    /// Remove the node at `--path` and save the scenario.
    Remove {
        scenario: PathBuf,
        #[arg(long)]
        path: String,
    },
}

// ── Helpers ─────────────────────────────────────────────────────────

fn load_scenario(path: &Path) -> anyhow::Result<ScenarioDocument> {
    let doc = DocumentStore::load_file(path).with_context(|| format!("loading {}", path.display()))?;
    match doc.as_scenario() {
        Some(s) => Ok(s.clone()),
        None => bail!("{} is a {} document, not a Scenario", path.display(), doc.kind()),
    }
}

fn load_data_model(path: &Path) -> anyhow::Result<DataModelDocument> {
    let doc = DocumentStore::load_file(path).with_context(|| format!("loading {}", path.display()))?;
    match doc.as_data_model() {
        Some(dm) => Ok(dm.clone()),
        None => bail!("{} is a {} document, not a DataModel", path.display(), doc.kind()),
    }
}

fn print_tree(tree: &ViewTree, schema: SchemaContext<'_>) -> anyhow::Result<()> {
    for id in tree.preorder() {
        let path = tree.path_of(id)?;
        let node = tree.subtree_to_ast(id)?;
        let label = match EditableNode::from_ast(&node, schema) {
            Some(editable) => {
                let d = editable.describe();
                format!("{} [{:?}, {:?}]", d.label, d.icon, d.data_type)
            }
            None => node.name.clone(),
        };
        let depth = path.split('.').filter(|s| !s.is_empty()).count();
        let shown = if path.is_empty() { "<root>" } else { path.as_str() };
        println!("{:indent$}{}  {}", "", shown, label, indent = depth * 2);
        for error in &tree.node(id)?.errors {
            println!("{:indent$}  ! {} {}", "", error.code, error.message, indent = depth * 2);
        }
    }
    Ok(())
}

fn check_dir(dir: PathBuf) -> anyhow::Result<()> {
    let mut store = DocumentStore::new(dir);
    let results = store
        .load_all()
        .with_context(|| format!("scanning {}", store.dir().display()))?;
    for result in &results {
        if let LoadStatus::Failed { error } = &result.status {
            println!("failed {}: {}", result.path.display(), error);
        }
    }

    let mut invalid = 0;
    for doc in store.scenarios() {
        let dm = store
            .data_model(doc.spec.data_model.as_deref())
            .with_context(|| format!("data model for scenario '{}'", doc.metadata.id))?;
        let result = validate_scenario(doc, &dm.data_model(), dm.custom_lists());
        if result.valid {
            println!("ok      {}", doc.metadata.id);
        } else {
            invalid += 1;
            println!("invalid {} ({} error(s))", doc.metadata.id, result.errors.len());
            for e in &result.errors {
                println!("        {}: {}", e.path, e.message);
            }
        }
    }
    if invalid > 0 {
        bail!("{} scenario(s) failed validation", invalid);
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scenario_core::config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.profile {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    config.validate()?;
    config.log_summary();

    if let Command::Check { dir } = &cli.command {
        let dir = dir.clone().unwrap_or_else(|| config.editor.documents_dir.clone());
        return check_dir(dir);
    }

    let data_model_path = cli.data_model.unwrap_or_else(|| config.editor.data_model_path.clone());
    let dm = load_data_model(&data_model_path)?;
    let model = dm.data_model();

    match cli.command {
        Command::Check { .. } => {}

        Command::Validate { scenario } => {
            let doc = load_scenario(&scenario)?;
            let result = validate_scenario(&doc, &model, dm.custom_lists());
            for w in &result.warnings {
                println!("warning {}: {}", w.path, w.message);
            }
            for e in &result.errors {
                match &e.suggestion {
                    Some(s) => println!("error {}: {} (did you mean '{}'?)", e.path, e.message, s),
                    None => println!("error {}: {}", e.path, e.message),
                }
            }
            if !result.valid {
                bail!("{} has {} error(s)", scenario.display(), result.errors.len());
            }
            println!("{} is valid", doc.metadata.id);
        }

        Command::Options { scenario, path, query } => {
            let doc = load_scenario(&scenario)?;
            let trigger = doc.spec.trigger_table.as_str();
            let payload = model.payload_accessors(trigger);
            let database = model.database_accessors(trigger, config.editor.accessor_link_depth);
            let schema = SchemaContext::new(&model, trigger, dm.custom_lists());
            let ctx = OperandContext::new(schema, &payload, &database);

            let tree = ViewTree::from_ast(&doc.spec.formula);
            let id = tree.find_by_path(&path)?;
            let options = OperandOptions::resolve(&tree, id, ctx)?;
            let query = query.unwrap_or_default();
            for option in options.search(&query) {
                let kind = format!("{:?}", option.kind);
                let data_type = format!("{:?}", option.data_type);
                println!("{:<12} {:<10} {}", kind, data_type, option.display_name);
            }
        }

        Command::Describe { scenario } => {
            let doc = load_scenario(&scenario)?;
            let trigger = doc.spec.trigger_table.as_str();
            let schema = SchemaContext::new(&model, trigger, dm.custom_lists());
            let validator = LocalValidator::new(model.clone(), trigger, dm.custom_lists().to_vec());

            let tree = ViewTree::from_ast(&doc.spec.formula);
            let tree = tree.merge_evaluation(&validator.evaluate(&doc.spec.formula))?;
            print_tree(&tree, schema)?;
        }

        Command::Remove { scenario, path } => {
            let mut doc = load_scenario(&scenario)?;
            let validator = LocalValidator::new(model.clone(), doc.spec.trigger_table.clone(), dm.custom_lists().to_vec());
            let timeout = Duration::from_millis(config.validation.timeout_ms);
            let mut handle = ValidationWorker::spawn(Arc::new(validator), timeout);

            let mut session = EditSession::open(&doc.spec.formula, handle.requests.clone());
            let id = session.tree().find_by_path(&path)?;
            session.remove(id)?;

            // Responses arrive in submission order; only the final revision merges.
            let merged = tokio::time::timeout(timeout, async {
                while let Some(response) = handle.responses.recv().await {
                    if session.apply_evaluation(&response)? == MergeOutcome::Merged {
                        return Ok::<bool, anyhow::Error>(true);
                    }
                }
                Ok(false)
            })
            .await;
            match merged {
                Ok(result) => {
                    if !result? {
                        warn!(path = %scenario.display(), "validation worker closed without answering");
                    }
                }
                Err(_) => warn!(path = %scenario.display(), "validation did not answer in time"),
            }
            handle.stop().await;

            let schema = SchemaContext::new(&model, &doc.spec.trigger_table, dm.custom_lists());
            print_tree(session.tree(), schema)?;

            doc.spec.formula = session.save();
            DocumentStore::write_file(&scenario, &Document::Scenario(doc))
                .with_context(|| format!("writing {}", scenario.display()))?;
            info!(path = %scenario.display(), revision = session.revision(), "scenario saved");
            println!("saved {}", scenario.display());
        }
    }

    Ok(())
}
