mod app;
mod document;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "nexus-graph.json")]
    document: PathBuf,

    #[arg(long)]
    actors: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "nexus-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::NexusApp::new(
                cc,
                args.document.clone(),
                args.actors.clone(),
            )))
        }),
    )
}
