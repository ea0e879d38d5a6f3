use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use luxestays::catalog::{self, FEATURED_COUNT};
use luxestays::identity::IdentityProvider;
use luxestays::{
    Booking, BookingRequest, Config, Listing, ListingFilter, ListingPatch, ListingSnapshot,
    NewListing, Services, Session,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "luxestays")]
#[command(about = "Browse stays, book them and moderate bookings.")]
struct CommandLine {
    #[arg(long, env = "LUXESTAYS_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "LUXESTAYS_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and print the session identity
    SignUp,
    /// Browse listings
    #[command(alias = "ls")]
    Listings {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        /// Matches name or city
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        include_unavailable: bool,
    },
    /// Show one listing
    Listing { id: String },
    /// The first few listings, as on the landing page
    Featured,
    Categories,
    AddCategory { name: String },
    AddListing {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        pincode: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Encoded image URI, repeat in display order
        #[arg(long = "image")]
        images: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        unavailable: bool,
    },
    UpdateListing {
        id: String,
        #[command(flatten)]
        edits: ListingEdits,
    },
    DeleteListing { id: String },
    /// Request a booking for a listing
    Book {
        listing_id: String,
        #[arg(long)]
        check_in: Option<NaiveDate>,
        #[arg(long)]
        check_out: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        guests: u32,
        #[arg(long, default_value = "")]
        address: String,
    },
    MyBookings,
    /// All bookings grouped by status
    Bookings,
    Approve { id: String },
    Reject { id: String },
}

/// Fields left out are not touched
#[derive(Args, Debug, Default)]
struct ListingEdits {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    pincode: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Replaces every image when given
    #[arg(long = "image")]
    images: Vec<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    available: Option<bool>,
}

impl ListingEdits {
    fn into_patch(self) -> ListingPatch {
        ListingPatch {
            name: self.name,
            price: self.price,
            address: self.address,
            postal_code: self.pincode,
            city: self.city,
            category: self.category,
            images: (!self.images.is_empty()).then_some(self.images),
            description: self.description,
            availability: self.available,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let commands = CommandLine::parse();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let identity = config.identity()?;
    let email = commands.email.as_deref().context("--email or LUXESTAYS_EMAIL is required")?;
    let password = commands
        .password
        .as_deref()
        .context("--password or LUXESTAYS_PASSWORD is required")?;

    if let Commands::SignUp = commands.command {
        let session = identity.sign_up(email, password).await.context("Sign up failed")?;
        println!("Signed up as {}", session.email());
        return Ok(());
    }

    let session = identity.sign_in(email, password).await.context("Sign in failed")?;
    info!("🏠 Signed in as {}", session.email());

    let services = Services::new(Arc::new(config.store()?));
    run(&services, &session, commands.command).await
}

async fn run(services: &Services, session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::SignUp => anyhow::bail!("sign-up runs without a session"),
        Commands::Listings {
            category,
            min_price,
            max_price,
            search,
            include_unavailable,
        } => {
            let filter = ListingFilter {
                available_only: !include_unavailable,
                category,
                min_price,
                max_price,
                search,
            };
            let listings = services.inventory.list_listings(session, &filter).await?;
            println!("{} listings\n", listings.len());
            for (i, listing) in listings.iter().enumerate() {
                print_listing(i + 1, listing);
            }
        }
        Commands::Listing { id } => {
            let listing = services
                .inventory
                .get_listing(session, &id)
                .await?
                .with_context(|| format!("Listing {} not found", id))?;
            print_listing(1, &listing);
            println!("   {}", listing.description);
        }
        Commands::Featured => {
            let listings = services.inventory.list_listings(session, &ListingFilter::default()).await?;
            for (i, listing) in catalog::featured(&listings, FEATURED_COUNT).enumerate() {
                print_listing(i + 1, listing);
            }
        }
        Commands::Categories => {
            for name in services.inventory.list_categories(session).await? {
                println!("{}", name);
            }
        }
        Commands::AddCategory { name } => {
            services.inventory.add_category(session, &name).await?;
            println!("Category {} added", name.trim());
        }
        Commands::AddListing {
            name,
            price,
            address,
            pincode,
            city,
            category,
            images,
            description,
            unavailable,
        } => {
            let listing = NewListing {
                address,
                postal_code: pincode,
                city,
                category,
                images,
                description,
                availability: !unavailable,
                ..NewListing::new(name, price)
            };
            let id = services.inventory.create_listing(session, listing).await?;
            println!("Listing created: {}", id);
        }
        Commands::UpdateListing { id, edits } => {
            services.inventory.update_listing(session, &id, edits.into_patch()).await?;
            println!("Listing {} updated", id);
        }
        Commands::DeleteListing { id } => {
            services.inventory.delete_listing(session, &id).await?;
            println!("Listing {} deleted", id);
        }
        Commands::Book {
            listing_id,
            check_in,
            check_out,
            guests,
            address,
        } => {
            let listing = services
                .inventory
                .get_listing(session, &listing_id)
                .await?
                .with_context(|| format!("Listing {} not found", listing_id))?;
            if !listing.availability {
                warn!("Listing {} is marked unavailable", listing_id);
            }

            let request = BookingRequest {
                check_in,
                check_out,
                guests,
                address,
            };
            let id = services
                .reservations
                .create_booking(session, &ListingSnapshot::of(&listing), &request)
                .await?;
            println!("Booking {} created, waiting for review", id);
        }
        Commands::MyBookings => {
            for booking in services.reservations.my_bookings(session).await? {
                print_booking(&booking);
            }
        }
        Commands::Bookings => {
            let queue = services.moderation.moderation_queue(session).await?;
            for (label, bookings) in [
                ("PENDING", &queue.pending),
                ("COMPLETED", &queue.completed),
                ("REJECTED", &queue.rejected),
            ] {
                println!("== {} ({})", label, bookings.len());
                for booking in bookings {
                    print_booking(booking);
                }
            }
        }
        Commands::Approve { id } => {
            let status = services.moderation.approve(session, &id).await?;
            println!("Booking {} is now {}", id, status);
        }
        Commands::Reject { id } => {
            let status = services.moderation.reject(session, &id).await?;
            println!("Booking {} is now {}", id, status);
        }
    }
    Ok(())
}

fn print_listing(n: usize, listing: &Listing) {
    println!("{}. {} (₹{}/night)", n, listing.name, listing.price);
    println!("   {}, {} {}", listing.address, listing.city, listing.postal_code);
    if !listing.category.is_empty() {
        println!("   Category: {}", listing.category);
    }
    if !listing.availability {
        println!("   Unavailable");
    }
    println!("   ID: {}", listing.id);
    println!();
}

fn print_booking(booking: &Booking) {
    println!("{}  {}", booking.id, booking.listing.name);
    println!(
        "   {} to {} ({} nights), {} guests, ₹{}",
        booking.check_in,
        booking.check_out,
        booking.nights(),
        booking.guests,
        booking.total_price
    );
    println!("   {} [{}]", booking.requester, booking.status.as_str().to_uppercase());
    println!();
}
