use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use fuelbill_pdf::model::generate_invoice_number;
use fuelbill_pdf::service::{JsonFileStore, OutboxDelivery};
use fuelbill_pdf::{
    DirectoryAssets, DocumentService, Error, RenderConfig, Renderer, ServiceConfig, config,
};

#[derive(Parser)]
#[command(name = "fuelbill-pdf")]
#[command(version, about = "Render fuel-purchase bills to PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding `<logo>.png` files [env: FUELBILL_ASSETS]
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// TrueType font for regular text [env: FUELBILL_FONT]
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    /// TrueType font for table headers [env: FUELBILL_BOLD_FONT]
    #[arg(long, global = true)]
    bold_font: Option<PathBuf>,

    /// Leave the page content stream uncompressed
    #[arg(long, global = true)]
    uncompressed: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a bill form to a PDF file
    Render {
        /// Bill form as JSON
        input: PathBuf,
        /// Output PDF path
        output: PathBuf,
    },

    /// Issue a bill: record it and deliver it to the outbox
    Issue {
        /// Bill form as JSON
        input: PathBuf,

        /// Outbox directory messages are written to
        #[arg(long)]
        outbox: PathBuf,

        /// JSON file of issued bills
        #[arg(long)]
        store: PathBuf,

        /// Sender address [env: FUELBILL_SENDER]
        #[arg(long)]
        sender: Option<String>,

        /// Replace the form's invoice number with a freshly generated one
        #[arg(long)]
        new_invoice: bool,
    },

    /// Deliver an already issued bill again
    Resend {
        invoice_number: String,

        #[arg(long)]
        outbox: PathBuf,

        #[arg(long)]
        store: PathBuf,

        #[arg(long)]
        sender: Option<String>,
    },
}

impl Cli {
    fn renderer(&self) -> Renderer {
        let mut render_config = RenderConfig::from_env();
        if let Some(font) = &self.font {
            render_config.font = Some(font.clone());
        }
        if let Some(font) = &self.bold_font {
            render_config.bold_font = Some(font.clone());
        }
        if self.uncompressed {
            render_config.compress = false;
        }
        let assets = self
            .assets
            .clone()
            .unwrap_or_else(config::asset_dir_from_env);
        Renderer::new(Arc::new(DirectoryAssets::new(assets)), render_config)
    }
}

fn service(
    renderer: Renderer,
    outbox: PathBuf,
    store: PathBuf,
    sender: Option<String>,
) -> Result<DocumentService, Error> {
    let mut service_config = ServiceConfig::from_env();
    if let Some(sender) = sender {
        service_config.sender_address = sender;
    }
    Ok(DocumentService::new(
        Arc::new(renderer),
        Arc::new(JsonFileStore::open(store)?),
        Arc::new(OutboxDelivery::new(outbox)),
        service_config,
    ))
}

fn run(cli: Cli) -> Result<(), Error> {
    let renderer = cli.renderer();
    match cli.command {
        Commands::Render { input, output } => {
            fuelbill_pdf::render_bill_file(&renderer, &input, &output)?;
            log::info!("Wrote {}", output.display());
        }
        Commands::Issue {
            input,
            outbox,
            store,
            sender,
            new_invoice,
        } => {
            let mut form = fuelbill_pdf::parse_bill(&std::fs::read_to_string(&input)?)?;
            if new_invoice {
                form.invoice_number = generate_invoice_number();
            }
            let issued = service(renderer, outbox, store, sender)?.issue(&form)?;
            println!("{}", issued.record.invoice_number);
        }
        Commands::Resend {
            invoice_number,
            outbox,
            store,
            sender,
        } => {
            service(renderer, outbox, store, sender)?.resend(&invoice_number)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
