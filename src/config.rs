// Command line configuration.

use crate::assets::DEFAULT_LOAD_TIMEOUT;
use crate::error::Error;
use crate::payment::{Amount, PaymentDescriptor, DEFAULT_AMOUNT};
use crate::popup::{default_session_path, DEFAULT_POPUP_DELAY};
use crate::scratcher::ScratchConfig;
use crate::surface::PixelReadPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "scratch-pay", version, about = "Scratch card reveal with UPI payment deep links")]
pub struct Cli {
    /// Verbose logging (RUST_LOG can then override the level)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the scratch card window
    Play(PlayArgs),
    /// Print the payment links for a target wallet
    Link(LinkArgs),
}

#[derive(Debug, Clone, Args)]
pub struct PaymentArgs {
    /// Payee UPI id (defaults to the merchant id)
    #[arg(long)]
    pub payee: Option<String>,

    /// Amount in rupees
    #[arg(long, default_value_t = DEFAULT_AMOUNT)]
    pub amount: f64,

    /// User agent used for platform detection (defaults to this host)
    #[arg(long)]
    pub user_agent: Option<String>,
}

impl PaymentArgs {
    pub fn amount(&self) -> Result<Amount, Error> {
        Amount::new(self.amount)
    }

    /// The reward payment. A non-blank `typed` id beats `--payee`, which beats
    /// the merchant default.
    pub fn descriptor(&self, typed: Option<&str>) -> Result<PaymentDescriptor, Error> {
        let payee = typed.filter(|id| !id.trim().is_empty()).or(self.payee.as_deref());
        Ok(PaymentDescriptor::reward(payee, self.amount()?))
    }
}

#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    /// Cover image drawn over the reward
    #[arg(long)]
    pub overlay: PathBuf,

    /// Reward image revealed by scratching
    #[arg(long)]
    pub reveal: PathBuf,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 480)]
    pub width: usize,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 640)]
    pub height: usize,

    /// Delay between reveal and payment popup, in milliseconds
    #[arg(long, default_value_t = DEFAULT_POPUP_DELAY.as_millis() as u64)]
    pub popup_delay_ms: u64,

    /// Give up waiting for the images after this many milliseconds
    #[arg(long, default_value_t = DEFAULT_LOAD_TIMEOUT.as_millis() as u64)]
    pub load_timeout_ms: u64,

    /// Refuse pixel reads on the scratch layer (progress can never be measured)
    #[arg(long)]
    pub restrict_pixel_reads: bool,

    /// Session file remembering an open payment popup across restarts
    #[arg(long, default_value_os_t = default_session_path())]
    pub session: PathBuf,

    #[command(flatten)]
    pub payment: PaymentArgs,
}

impl PlayArgs {
    pub fn scratch_config(&self) -> ScratchConfig {
        ScratchConfig {
            pixel_reads: if self.restrict_pixel_reads {
                PixelReadPolicy::Restricted
            } else {
                PixelReadPolicy::Allowed
            },
            ..ScratchConfig::default()
        }
    }

    pub fn popup_delay(&self) -> Duration {
        Duration::from_millis(self.popup_delay_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

#[derive(Debug, Clone, Args)]
pub struct LinkArgs {
    /// Android package of the wallet app; empty or unknown means any UPI app
    #[arg(long, default_value = "")]
    pub target: String,

    #[command(flatten)]
    pub payment: PaymentArgs,
}
