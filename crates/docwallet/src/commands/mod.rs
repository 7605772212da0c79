//! Command dispatch: bridges CLI args -> wallet state -> output formatting.

pub mod add_types;
pub mod config_cmd;
pub mod list;
pub mod share;
pub mod stack;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use docwallet_api::SharingClient;
use docwallet_config::Config;
use docwallet_core::{
    CardFactory, CardRef, CardServices, CollectionDeps, CollectionState,
    InMemoryReorderingService, NoopBrightness, ViewEvent, WalletContext,
};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::store::{FileProvider, FileStore};

/// Dispatch a wallet-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    cfg: &Config,
    client: SharingClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => {
            let wallet = Wallet::open(&args.source.documents, cfg, client)?;
            list::handle(&wallet, global)
        }
        Command::Stack(args) => {
            let wallet = Wallet::open(&args.source.documents, cfg, client)?;
            stack::handle(&wallet, &args.doc_type, global)
        }
        Command::Share(args) => {
            let wallet = Wallet::open(&args.source.documents, cfg, client)?;
            share::handle(&wallet, &args, global).await
        }
        Command::AddTypes => add_types::handle(&client, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a wallet".into(),
        }),
    }
}

// ── Wallet ───────────────────────────────────────────────────────────

/// The documents file wired to the core state machine.
pub struct Wallet {
    pub context: WalletContext,
    pub store: Arc<FileStore>,
    pub provider: Arc<FileProvider>,
    pub reordering: Arc<InMemoryReorderingService>,
}

impl Wallet {
    pub fn open(path: &Path, cfg: &Config, client: SharingClient) -> Result<Self, CliError> {
        cfg.validate()?;
        let context = WalletContext::new(cfg.to_wallet_config(), Arc::new(NoopBrightness));
        let bus = context.bus().clone();

        let store = Arc::new(FileStore::open(path, bus.clone())?);
        let services = CardServices {
            sharing: Arc::new(client),
            bus: bus.clone(),
        };
        let factory = CardFactory::new(services, store.clone(), store.clone())
            .with_urls(cfg.to_driver_license_urls());
        let provider = Arc::new(FileProvider::new(Arc::clone(&store), factory));
        let reordering = Arc::new(InMemoryReorderingService::with_types(
            bus,
            store.snapshot().type_order(),
        ));

        Ok(Self {
            context,
            store,
            provider,
            reordering,
        })
    }

    /// A configured collection plus the receiver of its view events.
    pub fn collection(&self) -> (CollectionState, mpsc::UnboundedReceiver<ViewEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let deps = CollectionDeps {
            provider: self.provider.clone(),
            reordering: self.reordering.clone(),
            loader: self.store.clone(),
        };
        let mut state = CollectionState::new(self.context.clone(), deps, tx);
        state.configure();
        (state, rx)
    }

    pub fn find_card(&self, id: &str) -> Result<CardRef, CliError> {
        self.provider
            .cards()
            .into_iter()
            .find(|card| card.id() == id)
            .ok_or_else(|| CliError::NotFound {
                resource_type: "document".into(),
                identifier: id.into(),
            })
    }
}

/// Drain whatever the state has queued for its view.
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<ViewEvent>) -> Vec<ViewEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
