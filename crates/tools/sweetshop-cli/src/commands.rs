//! Command handlers.
//!
//! Each command restores the stored session first, except `login` and
//! `register` which replace it and `logout` which only clears it. Admin
//! commands are refused locally when the session does not carry the admin
//! capability; the backend still authorizes every request on its own.

use crate::cli::{Commands, ItemArgs, SearchArgs};
use crate::config::CliConfig;
use crate::render;
use anyhow::{Result, bail};
use console::{Term, style};
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};
use std::sync::Arc;
use sweetshop_client::{
    FileSessionStore, InMemorySessionStore, SessionStore, Sweet, SweetCreate, SweetShopClient,
};
use tracing::debug;

pub struct App {
    client: SweetShopClient,
    term: Term,
}

impl App {
    pub fn new(client: SweetShopClient) -> Self {
        Self {
            client,
            term: Term::stdout(),
        }
    }

    /// Build the client described by `config`
    pub fn from_config(config: &CliConfig) -> Result<Self> {
        let store: Arc<dyn SessionStore> = if config.session.persist {
            let path = config.session_path()?;
            debug!(path = %path.display(), "Using session file");
            Arc::new(FileSessionStore::new(path))
        } else {
            Arc::new(InMemorySessionStore::new())
        };

        let client = SweetShopClient::new(config.client_config(), store)?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &SweetShopClient {
        &self.client
    }

    pub async fn execute(&self, command: Commands) -> Result<()> {
        if !matches!(
            command,
            Commands::Login { .. } | Commands::Register { .. } | Commands::Logout
        ) {
            self.client.session.restore().await?;
        }

        match command {
            Commands::Login { username } => self.login(username).await,
            Commands::Register { username, email } => self.register(username, email).await,
            Commands::Logout => self.logout().await,
            Commands::Whoami => self.whoami().await,
            Commands::List => self.list().await,
            Commands::Search(args) => self.search(args).await,
            Commands::Show { id } => self.show(id).await,
            Commands::Purchase { id, quantity } => self.purchase(id, quantity).await,
            Commands::Restock { id, quantity } => self.restock(id, quantity).await,
            Commands::Add(fields) => self.add(fields).await,
            Commands::Edit { id, fields } => self.edit(id, fields).await,
            Commands::Delete { id, yes } => self.delete(id, yes).await,
        }
    }

    fn success(&self, message: impl AsRef<str>) -> Result<()> {
        self.term
            .write_line(&format!("{} {}", style("✓").green(), message.as_ref()))?;
        Ok(())
    }

    async fn require_login(&self) -> Result<()> {
        if !self.client.session.is_authenticated().await {
            bail!("Not logged in. Run `sweetshop login` first.");
        }
        Ok(())
    }

    async fn require_admin(&self) -> Result<()> {
        self.require_login().await?;
        if !self.client.session.is_admin().await {
            bail!("This command requires an admin account");
        }
        Ok(())
    }

    async fn login(&self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(username) => username,
            None => Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Username")
                .interact_text()?,
        };
        let password = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?;

        self.client.session.login(&username, &password).await?;

        let is_admin = self.client.session.is_admin().await;
        self.success(format!(
            "Logged in as {} ({})",
            style(&username).bold(),
            render::role_badge(is_admin)
        ))
    }

    async fn register(&self, username: Option<String>, email: Option<String>) -> Result<()> {
        let theme = ColorfulTheme::default();
        let username = match username {
            Some(username) => username,
            None => Input::with_theme(&theme)
                .with_prompt("Username")
                .interact_text()?,
        };
        let email = match email {
            Some(email) => email,
            None => Input::with_theme(&theme)
                .with_prompt("Email")
                .interact_text()?,
        };
        let password = Password::with_theme(&theme)
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?;

        self.client
            .session
            .register(&username, &email, &password)
            .await?;

        self.success(format!("Registered and logged in as {}", style(&username).bold()))
    }

    async fn logout(&self) -> Result<()> {
        self.client.session.logout().await;
        self.success("Logged out")
    }

    async fn whoami(&self) -> Result<()> {
        let session = &self.client.session;
        if !session.is_authenticated().await {
            self.term.write_line("Not logged in")?;
            return Ok(());
        }

        let is_admin = session.is_admin().await;
        match session.user().await {
            Some(profile) => self
                .term
                .write_line(&render::profile_line(&profile, is_admin))?,
            None => self.term.write_line(&format!(
                "Logged in, profile unavailable ({})",
                render::role_badge(is_admin)
            ))?,
        }
        Ok(())
    }

    async fn print_items(&self, items: &[Sweet]) -> Result<()> {
        let is_admin = self.client.session.is_admin().await;
        if items.is_empty() {
            self.term
                .write_line(&render::empty_catalog_message(is_admin))?;
            return Ok(());
        }

        for item in items {
            let actions = self.client.catalog.actions_for(item, is_admin);
            self.term.write_line(&render::item_line(item, actions))?;
        }
        Ok(())
    }

    async fn list(&self) -> Result<()> {
        self.require_login().await?;
        let items = self.client.catalog.load_all().await?;
        self.print_items(&items).await
    }

    async fn search(&self, args: SearchArgs) -> Result<()> {
        self.require_login().await?;
        self.client.catalog.load_all().await?;
        let items = self.client.catalog.set_filter(args.to_filter()).await;
        self.print_items(&items).await
    }

    async fn show(&self, id: i64) -> Result<()> {
        self.require_login().await?;
        let item = self.client.catalog.get(id).await?;
        self.term.write_line(&render::item_details(&item))?;
        Ok(())
    }

    async fn purchase(&self, id: i64, quantity: u32) -> Result<()> {
        self.require_login().await?;
        // Known stock levels feed the out-of-stock check.
        self.client.catalog.load_all().await?;

        let item = self.client.catalog.purchase(id, quantity).await?;
        self.success(format!(
            "Purchased {} × {} ({} left)",
            quantity,
            style(&item.name).bold(),
            item.quantity
        ))
    }

    async fn restock(&self, id: i64, quantity: Option<u32>) -> Result<()> {
        self.require_admin().await?;
        let quantity = match quantity {
            Some(quantity) => quantity,
            None => Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Enter restock quantity")
                .interact_text()?,
        };

        let item = self.client.catalog.restock(id, quantity).await?;
        self.success(format!(
            "Restocked {} (now {} in stock)",
            style(&item.name).bold(),
            item.quantity
        ))
    }

    async fn add(&self, fields: ItemArgs) -> Result<()> {
        self.require_admin().await?;
        let theme = ColorfulTheme::default();

        let item = SweetCreate {
            name: match fields.name {
                Some(name) => name,
                None => Input::with_theme(&theme).with_prompt("Name").interact_text()?,
            },
            category: match fields.category {
                Some(category) => category,
                None => Input::with_theme(&theme)
                    .with_prompt("Category")
                    .interact_text()?,
            },
            price: match fields.price {
                Some(price) => price,
                None => Input::with_theme(&theme)
                    .with_prompt("Price")
                    .interact_text()?,
            },
            quantity: match fields.quantity {
                Some(quantity) => quantity,
                None => Input::with_theme(&theme)
                    .with_prompt("Quantity")
                    .default(0)
                    .interact_text()?,
            },
        };

        let created = self.client.catalog.create(item).await?;
        self.success(format!(
            "Added {} as #{}",
            style(&created.name).bold(),
            created.id
        ))
    }

    async fn edit(&self, id: i64, fields: ItemArgs) -> Result<()> {
        self.require_admin().await?;
        let patch = fields.to_update();
        if patch.is_empty() {
            bail!("Nothing to update; pass at least one of --name, --category, --price, --quantity");
        }

        let updated = self.client.catalog.update(id, patch).await?;
        self.success(format!("Updated {}", style(&updated.name).bold()))
    }

    async fn delete(&self, id: i64, yes: bool) -> Result<()> {
        self.require_admin().await?;

        if !yes
            && !Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Are you sure you want to delete this sweet?")
                .default(false)
                .interact()?
        {
            self.term.write_line("Cancelled")?;
            return Ok(());
        }

        self.client.catalog.delete(id).await?;
        self.success(format!("Deleted sweet #{}", id))
    }
}
