use std::{path::PathBuf, sync::Arc};

use addresses::{
    config::Config,
    form::AddressForm,
    map::{MapSession, MapState},
    persist::{PersistentStore, Storage},
    services::{HttpResolver, Permission, Resolver, StaticLocator},
    store::{self, Outcome},
    Address, AddressId, AddressType, Coordinates, Location, Pincode,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "addresses", about = "Keep a book of postal addresses")]
struct Cli {
    #[arg(long, env = "ADDRESSES_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the storage directory from the config file.
    #[arg(long, env = "ADDRESSES_DATA")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every address, default first in line with the rest.
    List {
        /// Also show how far each address is from here.
        #[arg(long)]
        near: Option<Coordinates>,
    },
    Add {
        #[command(flatten)]
        fields: Fields,
        #[command(flatten)]
        pick: Pick,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: Fields,
        #[command(flatten)]
        pick: Pick,
    },
    Delete {
        id: String,
    },
    SetDefault {
        id: String,
    },
    /// Print the default address.
    Default,
    /// Reverse geocode a point, or the device's position.
    Locate {
        at: Option<Coordinates>,
    },
    /// Look up the city and state for a pincode.
    Pincode {
        code: Pincode,
    },
}

#[derive(Debug, Args)]
struct Fields {
    #[arg(long)]
    flat: Option<String>,
    #[arg(long)]
    building: Option<String>,
    #[arg(long)]
    line1: Option<String>,
    #[arg(long)]
    pincode: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long = "type", value_enum)]
    kind: Option<AddressType>,
    /// Mark the address as the default one.
    #[arg(long)]
    default: bool,
}

#[derive(Debug, Args)]
struct Pick {
    /// Prefill from the address at this point.
    #[arg(long, conflicts_with = "here")]
    at: Option<Coordinates>,
    /// Prefill from the device's position.
    #[arg(long)]
    here: bool,
}

impl Fields {
    fn apply(self, form: &mut AddressForm) {
        let draft = &mut form.draft;
        for (field, value) in [
            (&mut draft.flat_number, self.flat),
            (&mut draft.building_name, self.building),
            (&mut draft.address_line1, self.line1),
            (&mut draft.pincode, self.pincode),
            (&mut draft.city, self.city),
            (&mut draft.state, self.state),
        ] {
            if let Some(x) = value {
                *field = x;
            }
        }
        if let Some(x) = self.kind {
            draft.kind = x;
        }
        if self.default {
            draft.is_default = true;
        }
    }
}

struct App {
    config: Config,
    resolver: Arc<HttpResolver>,
    store: PersistentStore,
}

impl App {
    fn session(&self) -> MapSession {
        MapSession::new(
            self.resolver.clone(),
            Arc::new(StaticLocator::new(self.config.device.position())),
            Arc::new(Permission::Granted),
            self.config.timeouts.clone(),
        )
    }

    async fn pick(&self, at: Option<Coordinates>) -> Result<Location> {
        let mut session = self.session();
        match at {
            Some(x) => session.open_at(x).await,
            None => session.open().await,
        }
        let location = session.confirm();
        session.close();

        match (location, session.state()) {
            (Some(x), _) => Ok(x),
            (None, MapState::PermissionBlocked) => {
                bail!("Location access has been blocked, enable it to proceed")
            }
            (None, MapState::Failed(e)) => bail!("Failed to get location: {e}"),
            (None, _) => bail!("Unable to get location"),
        }
    }

    async fn fill(&mut self, form: &mut AddressForm, pick: Pick) -> Result<()> {
        if pick.at.is_none() && !pick.here {
            return Ok(());
        }
        let location = self.pick(pick.at).await?;
        eprintln!("Picked {}", location.address.formatted_address);
        form.load_location(
            &location,
            self.resolver.as_ref(),
            self.config.timeouts.geocode(),
        )
        .await;
        self.store
            .dispatch(store::Command::SetLocation(location))?;
        Ok(())
    }

    fn existing(&self, id: &str) -> Result<AddressId> {
        let id = AddressId::from(id);
        if self.store.get(&id).is_none() {
            bail!("No address with id {id}");
        }
        Ok(id)
    }
}

fn print_address(x: &Address, near: Option<&Coordinates>) {
    let mut header = format!("[{}] {}", x.id, x.kind);
    if x.is_default {
        header.push_str(" (Default)");
    }
    if let (Some(here), Some(there)) = (near, &x.coordinates) {
        header.push_str(&format!(" {:.1} km away", here.distance_to(there) / 1000.0));
    }
    println!("{header}");

    let unit = [&x.flat_number, &x.building_name]
        .iter()
        .filter(|x| !x.is_empty())
        .join(", ");
    if !unit.is_empty() {
        println!("  {unit}");
    }
    println!("  {}", x.address_line1);
    println!("  {}, {} - {}", x.city, x.state, x.pincode);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let dir = cli.data.unwrap_or_else(|| config.storage.dir.clone());
    let store = PersistentStore::open(Storage::new(&dir))
        .with_context(|| format!("Failed to open address book in {}", dir.display()))?;
    let resolver = Arc::new(HttpResolver::new(
        config.geocoding.clone(),
        config.pincode.clone(),
    ));
    let mut app = App {
        config,
        resolver,
        store,
    };

    match cli.command {
        Command::List { near } => {
            if app.store.addresses().is_empty() {
                println!("No addresses yet");
            }
            for x in app.store.addresses() {
                print_address(x, near.as_ref());
                println!();
            }
        }
        Command::Add { fields, pick } => {
            let mut form = AddressForm::new();
            app.fill(&mut form, pick).await?;
            fields.apply(&mut form);
            let command = form.submit(app.store.store().current_location())?;
            let id = match command {
                store::Command::AddAddress(draft) => app.store.add(draft)?,
                x => bail!("unexpected form result: {x:?}"),
            };
            println!("Added address {id}");
        }
        Command::Edit { id, fields, pick } => {
            let id = app.existing(&id)?;
            let mut form = AddressForm::edit(app.store.store(), &id);
            app.fill(&mut form, pick).await?;
            fields.apply(&mut form);
            let command = form.submit(app.store.store().current_location())?;
            app.store.dispatch(command)?;
            println!("Updated address {id}");
        }
        Command::Delete { id } => {
            let id = AddressId::from(id.as_str());
            match app.store.dispatch(store::Command::DeleteAddress(id.clone()))? {
                Outcome::Applied => println!("Deleted address {id}"),
                Outcome::Unchanged => println!("No address with id {id}"),
            }
        }
        Command::SetDefault { id } => {
            let id = app.existing(&id)?;
            app.store
                .dispatch(store::Command::SetDefaultAddress(id.clone()))?;
            println!("Address {id} is now the default");
        }
        Command::Default => match app.store.store().get_default() {
            Some(x) => print_address(x, None),
            None => println!("No default address"),
        },
        Command::Locate { at } => {
            let location = app.pick(at).await?;
            let x = &location.address;
            println!("{}", x.formatted_address);
            let detail = [&x.city, &x.state, &x.postal_code]
                .iter()
                .filter_map(|x| x.as_deref())
                .join(", ");
            if !detail.is_empty() {
                println!("{detail}");
            }
            let at = location.coordinates;
            println!("{:.6},{:.6}", at.latitude, at.longitude);
        }
        Command::Pincode { code } => {
            match app
                .resolver
                .lookup_postal_code(code.as_str())
                .await
                .with_context(|| format!("Failed to look up pincode {code}"))?
            {
                Some(x) => println!("{}, {}", x.city, x.state),
                None => println!("No data for pincode {code}"),
            }
        }
    }

    Ok(())
}
