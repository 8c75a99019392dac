use clap::{Parser, Subcommand, ValueEnum};
use feedesk::{
    db,
    models::user::Role,
    repositories::SqliteUserRepository,
    services::auth_service::AuthSession,
    services::user_service::{SignupRequest, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "feedesk-cli")]
#[command(about = "CLI tool for managing FeeDesk accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    AdminOwner,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new account (use --role admin-owner with --school to
    /// bootstrap a school's owner)
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Gmail address
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Account role
        #[arg(long, value_enum, default_value_t = RoleArg::User)]
        role: RoleArg,

        /// School name (required for admin-owner)
        #[arg(long)]
        school: Option<String>,
    },

    /// List all accounts
    List,

    /// Delete an account
    Delete {
        /// Username of the account to delete
        #[arg(short, long)]
        username: String,

        /// Act as this existing account (defaults to the system operator)
        #[arg(long, default_value = "system")]
        acting_as: String,
    },

    /// Set a new password for an account
    SetPassword {
        /// Username of the account
        #[arg(short, long)]
        username: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Act as this existing account (defaults to the system operator)
        #[arg(long, default_value = "system")]
        acting_as: String,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn confirm_password(prompt: &str) -> anyhow::Result<(String, String)> {
    let password = get_password(prompt)?;
    let confirm = get_password("Confirm password")?;
    Ok((password, confirm))
}

/// The session the service layer acts under. "system" is the operator
/// identity accounts created at signup are attributed to.
async fn resolve_actor(user_service: &UserService, acting_as: &str) -> anyhow::Result<AuthSession> {
    if acting_as == "system" {
        return Ok(AuthSession {
            username: "system".to_string(),
            role: Role::AdminOwner,
            school_name: None,
            trial_remaining_secs: 0,
        });
    }

    let user = user_service
        .find_user(acting_as)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Acting account '{}' not found", acting_as))?;

    Ok(AuthSession {
        username: user.username,
        role: user.role,
        school_name: user.school_name,
        trial_remaining_secs: 0,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let pool = db::create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = Arc::new(UserService::new(user_repository));

    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                username,
                email,
                password,
                role,
                school,
            } => {
                let (password, password_confirm) = if let Some(pw) = password {
                    (pw.clone(), pw)
                } else {
                    confirm_password("Password")?
                };

                let request = SignupRequest {
                    username: username.clone(),
                    password,
                    password_confirm: Some(password_confirm),
                    email: email.clone(),
                    school_name: school,
                    admin_owner: matches!(role, RoleArg::AdminOwner),
                };

                match user_service.signup(request).await {
                    Ok(user) => {
                        println!("✅ Account created successfully!");
                        println!("  Username: {}", user.username);
                        println!("  Email: {}", user.email);
                        println!("  Role: {}", user.role.label());
                        if let Some(school) = user.school_name {
                            println!("  School: {}", school);
                        }
                        println!("  Trial ends: {}", user.trial_end);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to create account: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::List => match user_service.list_all_users().await {
                Ok(users) => {
                    if users.is_empty() {
                        println!("No accounts found.");
                    } else {
                        println!(
                            "{:<20} {:<30} {:<12} {:<20} {:<30}",
                            "Username", "Email", "Role", "School", "Trial Remaining"
                        );
                        println!("{}", "-".repeat(112));
                        for user in users {
                            println!(
                                "{:<20} {:<30} {:<12} {:<20} {:<30}",
                                user.username,
                                user.email,
                                user.role_label,
                                user.school_name.as_deref().unwrap_or("N/A"),
                                user.trial_remaining
                            );
                        }
                    }
                }
                Err(err) => {
                    eprintln!("❌ Failed to list accounts: {}", err);
                    std::process::exit(1);
                }
            },

            UserCommands::Delete {
                username,
                acting_as,
            } => {
                let actor = resolve_actor(&user_service, &acting_as).await?;
                match user_service.delete_user(&actor, &username).await {
                    Ok(()) => {
                        println!("✅ Account '{}' deleted successfully!", username);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to delete account: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::SetPassword {
                username,
                password,
                acting_as,
            } => {
                let actor = resolve_actor(&user_service, &acting_as).await?;

                let (new_password, password_confirm) = if let Some(pw) = password {
                    (pw.clone(), pw)
                } else {
                    confirm_password("New password")?
                };

                match user_service
                    .reset_password(&actor, &username, &new_password, Some(&password_confirm))
                    .await
                {
                    Ok(()) => {
                        println!("✅ Password updated successfully for '{}'!", username);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to update password: {}", err);
                        std::process::exit(1);
                    }
                }
            }
        },
    }

    Ok(())
}
