use crate::cache::{CacheCoordinator, CoordinatorSettings, MemoryStore, RecordStore, SqliteStore};
use crate::config::Config;
use crate::connectivity::{ConnectivityMonitor, ManualPlatform, NetworkPlatform, ProbePlatform};
use crate::db::Database;
use crate::pokedex::bundle::BundleDir;
use crate::pokedex::client::PokeApiClient;
use crate::pokedex::types::{Pokemon, SortOrder};
use crate::prefs::SqlitePreferences;
use crate::view::{HomeModel, LoadStatus};
use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// What to do once the cache is wired up
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
  /// List cached Pokémon, loading the first page if the cache is empty
  List {
    /// Keep only names or numbers containing this text
    #[arg(short, long)]
    query: Option<String>,

    /// Change (and remember) the sort order
    #[arg(short, long, value_enum)]
    sort: Option<SortOrder>,
  },
  /// Show one Pokémon, fetching it if missing or stale
  Show {
    id: u32,

    /// Only look in the cache
    #[arg(long)]
    cached: bool,
  },
  /// Refresh the cache from the network if it is stale
  Refresh {
    /// Refresh even if the cache is fresh
    #[arg(short, long)]
    force: bool,
  },
  /// Load more bundled pages into the cache
  More {
    #[arg(short, long, default_value_t = 1)]
    pages: usize,
  },
  /// Remember a sort order for listing
  Sort {
    #[arg(value_enum)]
    order: SortOrder,
  },
  /// Delete every cached Pokémon
  Clear,
  /// Print connectivity changes until interrupted
  Watch,
}

/// How the collaborators are chosen
#[derive(Debug, Clone, Default)]
pub struct Options {
  /// Never touch the network
  pub offline: bool,
  /// Keep everything in memory
  pub ephemeral: bool,
}

/// Main application state
pub struct App {
  coordinator: Arc<CacheCoordinator>,
  home: HomeModel,
}

impl App {
  pub async fn new(config: Config, options: Options) -> Result<Self> {
    let (store, prefs_db): (Arc<dyn RecordStore>, Database) = if options.ephemeral {
      (Arc::new(MemoryStore::new()), Database::open_in_memory()?)
    } else {
      let path = match &config.cache.path {
        Some(path) => path.clone(),
        None => Config::data_dir()?.join("cache.db"),
      };
      let db = Database::open(&path)?;
      (Arc::new(SqliteStore::new(db.clone())?), db)
    };

    let platform: Arc<dyn NetworkPlatform> = if options.offline {
      info!("offline mode: network disabled");
      Arc::new(ManualPlatform::new())
    } else {
      ProbePlatform::start(
        config.connectivity.probe_addr.clone(),
        Duration::from_secs(config.connectivity.interval_secs),
        Duration::from_millis(config.connectivity.timeout_ms),
      )
      .await
    };

    let bundle = BundleDir::new(
      config.bundle_dir()?,
      config.bundle.prefix.clone(),
      config.cache.page_size,
    );
    debug!(dir = %bundle.dir().display(), "using bundled pages");

    let coordinator = Arc::new(CacheCoordinator::new(
      store,
      Arc::new(bundle),
      Arc::new(PokeApiClient::new(&config)?),
      ConnectivityMonitor::new(platform),
      CoordinatorSettings::from_config(&config),
    ));

    let home = HomeModel::new(coordinator.clone(), Arc::new(SqlitePreferences::new(prefs_db)))?;

    Ok(Self { coordinator, home })
  }

  pub async fn run(&mut self, command: Command) -> Result<()> {
    match command {
      Command::List { query, sort } => {
        if let Some(order) = sort {
          self.home.set_sort_order(order)?;
        }
        if let Some(query) = query {
          self.home.set_query(query);
        }
        self.home.initialize().await;
        self.report_status();
        self.print_list();
      }
      Command::Show { id, cached: true } => match self.coordinator.cached(id)? {
        Some(pokemon) => print_detail(&pokemon),
        None => return Err(eyre!("Pokémon {} is not cached", id)),
      },
      Command::Show { id, cached: false } => {
        let pokemon = self.coordinator.fetch_one(id).await?;
        print_detail(&pokemon);
      }
      Command::Refresh { force } => {
        self.home.refresh(force).await;
        self.check_status()?;
        println!("{} Pokémon cached", self.home.cached_count());
      }
      Command::More { pages } => {
        for _ in 0..pages {
          self.home.load_more().await;
          self.check_status()?;
          if self.home.end_reached() {
            println!("No more pages");
            break;
          }
        }
        println!(
          "{} Pokémon cached ({} pages read)",
          self.home.cached_count(),
          self.coordinator.page_cursor()
        );
      }
      Command::Sort { order } => {
        self.home.set_sort_order(order)?;
        println!("Sort order set to {}", order);
      }
      Command::Clear => {
        self.coordinator.clear_cache()?;
        println!("Cache cleared");
      }
      Command::Watch => self.watch().await?,
    }

    Ok(())
  }

  async fn watch(&self) -> Result<()> {
    let mut connectivity = self.coordinator.connectivity().subscribe();

    loop {
      tokio::select! {
        state = connectivity.next() => match state {
          Some(true) => println!("online"),
          Some(false) => println!("offline"),
          None => break,
        },
        _ = tokio::signal::ctrl_c() => break,
      }
    }
    Ok(())
  }

  /// Surface a failed operation as the command's error.
  fn check_status(&self) -> Result<()> {
    match self.home.status() {
      LoadStatus::Error(e) => Err(eyre!("{}", e)),
      _ => Ok(()),
    }
  }

  /// Listing still works from cache when loading failed, so only warn.
  fn report_status(&self) {
    if let Some(e) = self.home.status().error() {
      eprintln!("warning: {}", e);
    }
  }

  fn print_list(&self) {
    let visible = self.home.visible();
    for pokemon in &visible {
      println!("#{:04} {:<16} {}", pokemon.id, pokemon.name, pokemon.types.join("/"));
    }
    println!(
      "{} of {} shown, sorted {}",
      visible.len(),
      self.home.cached_count(),
      self.home.sort_order()
    );
  }
}

fn print_detail(pokemon: &Pokemon) {
  println!("#{:04} {}", pokemon.id, pokemon.name);
  println!("  types:  {}", pokemon.types.join("/"));
  println!("  height: {:.1} m", pokemon.height);
  println!("  weight: {:.1} kg", pokemon.weight);
  for (label, value) in pokemon.stats.labelled() {
    println!("  {:<7} {}", format!("{}:", label), value);
  }
}
