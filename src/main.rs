//! Mini-Pager CLI: paginate a markup file and print the result as JSON
//! The main interface is through WASM bindings.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), mini_pager::PagerError> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use clap::Parser;
    use mini_pager::{Pager, PagerConfig, PagerError};
    use std::fs;
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(version, about, long_about = None)]
    struct Args {
        /// Markup file holding the document body
        input: PathBuf,

        /// JSON pager config (page size, margins, policy)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the recombined document instead of the page report
        #[arg(long, default_value_t = false)]
        recombine: bool,

        /// Pretty-print the JSON output
        #[arg(long, default_value_t = false)]
        pretty: bool,
    }

    pub fn run() -> Result<(), PagerError> {
        env_logger::init();
        let args = Args::parse();

        let config = match &args.config {
            Some(path) => PagerConfig::from_json(&fs::read_to_string(path)?)?,
            None => PagerConfig::default(),
        };
        let markup = fs::read_to_string(&args.input)?;
        let pager = Pager::with_markup(&markup, config)?;
        log::info!(
            "{} paginated onto {} pages",
            args.input.display(),
            pager.page_count()
        );

        let json = match (args.recombine, args.pretty) {
            (true, true) => serde_json::to_string_pretty(&pager.document_markup())?,
            (true, false) => serde_json::to_string(&pager.document_markup())?,
            (false, true) => serde_json::to_string_pretty(&pager.report())?,
            (false, false) => serde_json::to_string(&pager.report())?,
        };
        println!("{json}");
        Ok(())
    }
}
