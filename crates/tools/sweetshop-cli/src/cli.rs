use clap::{Parser, Subcommand};
use sweetshop_client::{Filter, SweetUpdate};

/// Sweet Shop command line client
#[derive(Parser, Debug)]
#[command(name = "sweetshop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL, overriding the configured one (e.g. http://localhost:8000/api)
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Log in with existing credentials
    Login {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Register a new account and log in
    Register {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged in user
    Whoami,
    /// List every sweet
    List,
    /// Search sweets by name, category and price range
    Search(SearchArgs),
    /// Show one sweet
    Show {
        id: i64,
    },
    /// Buy a sweet
    Purchase {
        id: i64,
        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Add stock to a sweet (admin)
    Restock {
        id: i64,
        /// Number of units; prompted for when omitted
        #[arg(short, long)]
        quantity: Option<u32>,
    },
    /// Add a new sweet (admin)
    Add(ItemArgs),
    /// Change a sweet (admin)
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ItemArgs,
    },
    /// Delete a sweet (admin)
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug, Default, PartialEq)]
pub struct SearchArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_name = "PRICE")]
    pub min_price: Option<String>,
    #[arg(long, value_name = "PRICE")]
    pub max_price: Option<String>,
}

impl SearchArgs {
    pub fn to_filter(&self) -> Filter {
        Filter {
            name: self.name.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
            min_price: self.min_price.clone().unwrap_or_default(),
            max_price: self.max_price.clone().unwrap_or_default(),
        }
    }
}

#[derive(clap::Args, Debug, Default, PartialEq)]
pub struct ItemArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub quantity: Option<u32>,
}

impl ItemArgs {
    pub fn to_update(&self) -> SweetUpdate {
        SweetUpdate {
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}
