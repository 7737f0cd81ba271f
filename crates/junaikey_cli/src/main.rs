//! `junaikey` command-line front-end.
//!
//! # Responsibility
//! - Load config, start logging and open the SQLite-backed context.
//! - Map each subcommand onto one core call and print the result.

use clap::{Parser, Subcommand};
use junaikey_core::growth::catalog;
use junaikey_core::{
    init_from_config, AppConfig, AppContext, LocalId, NoteDraft, ProposalDraft, SyncOutcome,
};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "junaikey", version, about = "Gamified knowledge garden")]
struct Cli {
    /// Config file (defaults to ~/.junaikey/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show spirits, avatars, profession and sync state
    Status,
    /// Award experience to a spirit
    Award { spirit_id: String, amount: u64 },
    /// Manage the selected profession
    Profession {
        #[command(subcommand)]
        action: ProfessionAction,
    },
    /// Manage notes
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
    /// Manage proposals
    Proposal {
        #[command(subcommand)]
        action: ProposalAction,
    },
    /// Run one push/pull pass against BoostSpace
    Sync,
}

#[derive(Subcommand)]
enum ProfessionAction {
    List,
    Select { profession_id: String },
    Clear,
}

#[derive(Subcommand)]
enum NoteAction {
    List,
    Add {
        title: String,
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Delete {
        #[arg(value_parser = parse_id)]
        id: LocalId,
    },
}

#[derive(Subcommand)]
enum ProposalAction {
    List,
    Add { title: String, description: String },
    Resonate {
        #[arg(value_parser = parse_id)]
        id: LocalId,
    },
}

fn parse_id(value: &str) -> Result<LocalId, String> {
    LocalId::parse_str(value.trim()).map_err(|err| format!("invalid id `{value}`: {err}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    init_from_config(&config)?;
    let context = AppContext::open(&config)?;

    match cli.command {
        Command::Status => print_status(&context),
        Command::Award { spirit_id, amount } => match context.add_exp(&spirit_id, amount)? {
            Some(award) => {
                println!(
                    "{}: +{} exp (base {}) -> level {} ({} exp)",
                    award.spirit_id,
                    award.applied_amount,
                    award.base_amount,
                    award.spirit.level,
                    award.spirit.exp
                );
                if let Some(avatar) = &award.avatar {
                    println!(
                        "  avatar {} -> level {}",
                        avatar.avatar_id, avatar.progress.level
                    );
                }
                for milestone in &award.milestones {
                    println!("  milestone reached: {} (level {})", milestone.title, milestone.level);
                }
            }
            None => println!("unknown spirit `{spirit_id}`; nothing awarded"),
        },
        Command::Profession { action } => match action {
            ProfessionAction::List => {
                for profession in &catalog::PROFESSIONS {
                    println!(
                        "{:<14} {:<14} {}",
                        profession.id, profession.name, profession.bonus_description
                    );
                }
            }
            ProfessionAction::Select { profession_id } => {
                context.select_profession(profession_id.as_str())?;
                if catalog::profession(&profession_id).is_none() {
                    println!("selected `{profession_id}` (no catalog bonus)");
                } else {
                    println!("selected `{profession_id}`");
                }
            }
            ProfessionAction::Clear => {
                context.clear_profession()?;
                println!("profession cleared");
            }
        },
        Command::Note { action } => match action {
            NoteAction::List => {
                for note in context.notes_snapshot() {
                    println!(
                        "{} [{}] {}",
                        note.id,
                        note.boost_space_id.as_deref().unwrap_or("local"),
                        note.title
                    );
                }
            }
            NoteAction::Add {
                title,
                content,
                tags,
            } => {
                let note = context.add_note(NoteDraft::new(title, content).with_tags(tags))?;
                println!("added note {}", note.id);
            }
            NoteAction::Delete { id } => {
                let note = context.delete_note(id)?;
                println!("deleted note {} ({})", note.id, note.title);
            }
        },
        Command::Proposal { action } => match action {
            ProposalAction::List => {
                let proposals = context.proposals();
                let store = proposals.lock().map_err(|_| "proposal store poisoned")?;
                for proposal in store.ranked() {
                    println!(
                        "{} resonance={} {}",
                        proposal.id, proposal.resonance, proposal.title
                    );
                }
            }
            ProposalAction::Add { title, description } => {
                let proposal = context.add_proposal(ProposalDraft::new(title, description))?;
                println!("added proposal {}", proposal.id);
            }
            ProposalAction::Resonate { id } => {
                let proposal = context.add_resonance(id)?;
                println!("{} now resonates at {}", proposal.title, proposal.resonance);
            }
        },
        Command::Sync => {
            let outcome = context.sync_with_boost_space().await;
            if let Some(message) = context.sync_state().message {
                println!("{message}");
            }
            match outcome {
                SyncOutcome::Completed(_) => {}
                SyncOutcome::Failed(err) => return Err(err.into()),
                SyncOutcome::Rejected { in_flight } => {
                    println!("sync already {}", in_flight.as_str());
                }
            }
        }
    }

    Ok(())
}

fn print_status(context: &AppContext) {
    let state = context.progression_snapshot();
    println!("junaikey core {}", junaikey_core::core_version());
    println!("summoner level {}", context.summoner_level());
    println!(
        "profession: {}",
        state.selected_profession_id.as_deref().unwrap_or("none")
    );
    for spirit in &state.spirits {
        println!(
            "  {:<8} {:<8} lv {:>3}  exp {:>6}/{}",
            spirit.id,
            spirit.name,
            spirit.level,
            spirit.exp,
            junaikey_core::exp_to_next_level(spirit.level)
        );
    }
    for avatar in &state.avatars {
        println!(
            "  {:<18} -> {:<8} lv {:>3}",
            avatar.id, avatar.spirit_id, avatar.level
        );
    }
    let sync = context.sync_state();
    println!(
        "notes {}  proposals {}  sync {}  last synced {}",
        context.notes_snapshot().len(),
        context.proposals_snapshot().len(),
        sync.status.as_str(),
        sync.last_synced_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    );
}
