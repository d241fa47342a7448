use clap::Subcommand;
use questhunt_core::{Config, QuestTarget};

#[derive(Subcommand)]
pub enum QuestsAction {
    /// List all quests
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one quest
    Show {
        /// Quest id
        id: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn print_quest(quest: &QuestTarget) {
    println!("{:>3}  {:<26} {} ({})", quest.id, quest.name, quest.place, quest.location);
}

pub fn run(action: QuestsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let catalog = super::load_catalog(&config)?;

    match action {
        QuestsAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog.quests())?);
            } else {
                for quest in catalog.quests() {
                    print_quest(quest);
                }
            }
        }
        QuestsAction::Show { id, json } => {
            let quest = catalog.find(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(quest)?);
            } else {
                print_quest(quest);
            }
        }
    }
    Ok(())
}
