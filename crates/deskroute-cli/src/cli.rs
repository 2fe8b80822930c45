use clap::{ArgGroup, Parser, Subcommand};
use deskroute_router::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "deskroute")]
#[command(
    author,
    version,
    about = "Route support requests: classify, escalate or answer from the knowledge base"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "deskroute.yaml", env = "DESKROUTE_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier from a labeled JSON Lines dataset
    Train {
        /// Dataset with `category` and `text_clean` or `text` per line
        #[arg(short, long)]
        data: PathBuf,

        /// Rule table (overrides config)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Where to write the model artifact (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Naive Bayes smoothing
        #[arg(long)]
        alpha: Option<f64>,

        /// Vocabulary size cap
        #[arg(long)]
        max_features: Option<usize>,
    },

    /// Route a single request
    Ask {
        /// Request text
        query: String,

        /// Number of answers to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the route as JSON
        #[arg(long)]
        json: bool,
    },

    /// Measure accuracy and escalation rate on labeled cases
    Eval {
        /// JSON Lines cases; a built-in smoke set is used when omitted
        #[arg(long)]
        cases: Option<PathBuf>,
    },

    /// Record whether an automatic answer helped
    #[command(group(ArgGroup::new("rating").required(true).args(["useful", "not_useful"])))]
    Feedback {
        /// Request text
        query: String,

        /// The answer solved the problem
        #[arg(long)]
        useful: bool,

        /// The answer did not help
        #[arg(long)]
        not_useful: bool,
    },

    /// Show request frequency per category from the feedback journal
    Stats,
}

impl Cli {
    /// Config values this invocation replaces
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::default();
        match &self.command {
            Commands::Train { rules, output, .. } => {
                overrides.rules_path = rules.clone();
                overrides.model_path = output.clone();
            }
            Commands::Ask { top_k, .. } => overrides.top_k = *top_k,
            _ => {}
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_global_flags() {
        let cli = Cli::parse_from(["deskroute", "ask", "Не могу войти", "-k", "5", "--verbose"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("deskroute.yaml"));
        assert_eq!(cli.overrides().top_k, Some(5));
        match cli.command {
            Commands::Ask { query, json, .. } => {
                assert_eq!(query, "Не могу войти");
                assert!(!json);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_train_overrides() {
        let cli = Cli::parse_from([
            "deskroute", "train", "--data", "train.jsonl", "--rules", "r.yaml", "-o", "m.json",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.rules_path, Some(PathBuf::from("r.yaml")));
        assert_eq!(overrides.model_path, Some(PathBuf::from("m.json")));
    }

    #[test]
    fn test_feedback_requires_exactly_one_rating() {
        assert!(Cli::try_parse_from(["deskroute", "feedback", "q"]).is_err());
        assert!(Cli::try_parse_from(["deskroute", "feedback", "q", "--useful", "--not-useful"]).is_err());
        assert!(Cli::try_parse_from(["deskroute", "feedback", "q", "--not-useful"]).is_ok());
    }
}
