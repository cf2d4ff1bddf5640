#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use portal::nav::{LogNavigator, Navigator, Route};
use portal::net::types::{
    Credentials, Customer, CustomerInput, FieldError, ProfileUpdate, Project, ProjectInput, ProjectStatus, Registration,
    Role, User, UserRecord,
};
use portal::toast::{Notifier, Toast, ToastVariant};
use portal::views::actions::{Actions, UserDeletion};
use portal::views::dashboard::load_summary;
use portal::views::guard::{Guarded, LOADING_MESSAGE, protect};
use portal::views::resource::{Customers, LoadState, Projects, Resource, ResourceList, Users};
use portal::{ApiError, ConfigError, HttpApi, PortalApi, PortalConfig, SessionManager, ViewContext, ViewScope};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("not signed in; pass --username and --password or set PORTAL_USERNAME and PORTAL_PASSWORD")]
    NotSignedIn,
    #[error("{0}")]
    Pending(&'static str),
    #[error("load was superseded")]
    Discarded,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "portal-cli", about = "Project Assignment Portal CLI")]
struct Cli {
    #[arg(long, env = "PORTAL_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "PORTAL_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the signed-in user.
    Whoami,
    /// Create an account with --username/--password, then sign in.
    Register(RegisterArgs),
    /// Totals, status breakdown and engineering effort.
    Dashboard,
    Customer(CustomerCommand),
    Project(ProjectCommand),
    User(UserCommand),
    /// Edit the signed-in user's own profile.
    Profile(ProfileArgs),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, default_value = "ENGINEER")]
    role: Role,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct CustomerCommand {
    #[command(subcommand)]
    command: CustomerSubcommand,
}

#[derive(Subcommand, Debug)]
enum CustomerSubcommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        details: Option<String>,
    },
    Update {
        customer_id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        details: Option<String>,
    },
    Delete {
        customer_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProjectSubcommand {
    List,
    Create(ProjectFields),
    Update {
        project_id: Uuid,
        #[command(flatten)]
        fields: ProjectFields,
    },
    Delete {
        project_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ProjectFields {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "PENDING")]
    status: ProjectStatus,
    #[arg(long)]
    details: Option<String>,
    #[arg(long)]
    customer_id: Uuid,
}

#[derive(Args, Debug)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
enum UserSubcommand {
    List,
    Delete { user_id: Uuid },
    Assign { user_id: Uuid, project_id: Uuid },
    Unassign { user_id: Uuid },
}

/// Prints toasts to stderr so stdout stays machine-readable.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => eprintln!("{}: {}", toast.title, toast.description),
            ToastVariant::Destructive => eprintln!("error: {}: {}", toast.title, toast.description),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PortalConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }

    let http = HttpApi::new(&config)?;
    tracing::debug!(base_url = http.base_url(), "portal cli starting");

    let api: Arc<dyn PortalApi> = Arc::new(http);
    let navigator: Arc<dyn Navigator> = Arc::new(LogNavigator);
    let session = Arc::new(SessionManager::new(api.clone(), navigator.clone()));
    let ctx = ViewContext::new(api, session.clone(), Arc::new(StderrNotifier), config.logout_delay);

    let credentials = match (cli.username, cli.password) {
        (Some(username), Some(password)) => Some(Credentials { username, password }),
        _ => None,
    };

    navigator.navigate(screen(&cli.command));
    match cli.command {
        Command::Register(args) => {
            let credentials = credentials.ok_or(CliError::NotSignedIn)?;
            run_register(&session, credentials, args).await
        }
        command => {
            sign_in(&session, credentials.as_ref()).await?;
            let guarded = protect(&session.session(), navigator.as_ref(), User::full_name);
            if matches!(guarded, Guarded::Loading) {
                return Err(CliError::Pending(LOADING_MESSAGE));
            }
            let name = guarded.rendered().ok_or(CliError::NotSignedIn)?;
            tracing::info!(user = %name, "signed in");
            run_command(&ctx, command).await
        }
    }
}

/// The screen a command stands in for.
fn screen(command: &Command) -> Route {
    match command {
        Command::Register(_) => Route::Register,
        Command::Whoami | Command::Dashboard | Command::Profile(_) => Route::Dashboard,
        Command::Customer(_) => Route::Customers,
        Command::Project(_) => Route::Projects,
        Command::User(_) => Route::Users,
    }
}

async fn sign_in(session: &SessionManager, credentials: Option<&Credentials>) -> Result<(), CliError> {
    let Some(credentials) = credentials else {
        session.mount().await;
        return Ok(());
    };
    credentials.validate().map_err(invalid)?;
    session.login(credentials).await?;
    Ok(())
}

async fn run_register(session: &SessionManager, credentials: Credentials, args: RegisterArgs) -> Result<(), CliError> {
    let registration = Registration {
        email: args.email,
        user_name: credentials.username,
        first_name: args.first_name,
        last_name: args.last_name,
        role: args.role,
        confirm_password: credentials.password.clone(),
        password: credentials.password,
    };
    registration.validate().map_err(invalid)?;
    let user = session.register(&registration).await?;
    print_json(&serde_json::to_value(user)?)
}

async fn run_command(ctx: &ViewContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Whoami => {
            let user = ctx.session.current_user().ok_or(CliError::NotSignedIn)?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Dashboard => {
            let summary = load_summary(ctx, &ViewScope::new()).await.ok_or(CliError::Discarded)??;
            print_json(&serde_json::to_value(summary)?)
        }
        Command::Customer(customer) => run_customer(ctx, customer).await,
        Command::Project(project) => run_project(ctx, project).await,
        Command::User(user) => run_user(ctx, user).await,
        Command::Profile(args) => {
            let update = ProfileUpdate { first_name: args.first_name, last_name: args.last_name, email: args.email };
            update.validate().map_err(invalid)?;
            let user = Actions::new(ctx.clone()).update_profile(&update).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Register(_) => Err(CliError::Invalid("register runs before sign-in".to_owned())),
    }
}

async fn run_customer(ctx: &ViewContext, customer: CustomerCommand) -> Result<(), CliError> {
    let actions = Actions::new(ctx.clone());
    match customer.command {
        CustomerSubcommand::List => run_list(ctx, Customers).await,
        CustomerSubcommand::Create { name, details } => {
            let input = CustomerInput { name, details };
            input.validate().map_err(invalid)?;
            let created = actions.create_customer(&input).await?;
            print_json(&serde_json::to_value(created)?)
        }
        CustomerSubcommand::Update { customer_id, name, details } => {
            let input = CustomerInput { name, details };
            input.validate().map_err(invalid)?;
            let existing: Customer = ctx.api.get_customer(customer_id).await?;
            let updated = actions.update_customer(&existing, &input).await?;
            print_json(&serde_json::to_value(updated)?)
        }
        CustomerSubcommand::Delete { customer_id } => {
            let existing = ctx.api.get_customer(customer_id).await?;
            actions.delete_customer(&existing).await?;
            Ok(())
        }
    }
}

async fn run_project(ctx: &ViewContext, project: ProjectCommand) -> Result<(), CliError> {
    let actions = Actions::new(ctx.clone());
    match project.command {
        ProjectSubcommand::List => run_list(ctx, Projects).await,
        ProjectSubcommand::Create(fields) => {
            let input = project_input(fields)?;
            let created = actions.create_project(&input).await?;
            print_json(&serde_json::to_value(created)?)
        }
        ProjectSubcommand::Update { project_id, fields } => {
            let input = project_input(fields)?;
            let existing: Project = ctx.api.get_project(project_id).await?;
            let updated = actions.update_project(&existing, &input).await?;
            print_json(&serde_json::to_value(updated)?)
        }
        ProjectSubcommand::Delete { project_id } => {
            let existing = ctx.api.get_project(project_id).await?;
            actions.delete_project(&existing).await?;
            Ok(())
        }
    }
}

async fn run_user(ctx: &ViewContext, user: UserCommand) -> Result<(), CliError> {
    let actions = Actions::new(ctx.clone());
    match user.command {
        UserSubcommand::List => run_list(ctx, Users).await,
        UserSubcommand::Delete { user_id } => {
            let member: UserRecord = ctx.api.get_user(user_id, false).await?;
            if let UserDeletion::DeletedSelf(logout) = actions.delete_user(&member).await? {
                // Let the forced logout finish before the process exits.
                if let Err(err) = logout.await {
                    tracing::warn!(error = %err, "forced logout task failed");
                }
            }
            Ok(())
        }
        UserSubcommand::Assign { user_id, project_id } => {
            let member = ctx.api.get_user(user_id, false).await?;
            let project = ctx.api.get_project(project_id).await?;
            let updated = actions.assign_project(&member, &project).await?;
            print_json(&serde_json::to_value(updated)?)
        }
        UserSubcommand::Unassign { user_id } => {
            let member = ctx.api.get_user(user_id, false).await?;
            let updated = actions.unassign_project(&member).await?;
            print_json(&serde_json::to_value(updated)?)
        }
    }
}

async fn run_list<R>(ctx: &ViewContext, resource: R) -> Result<(), CliError>
where
    R: Resource,
    R::Item: serde::Serialize,
{
    let list = ResourceList::new(resource, ctx.clone());
    match list.load().await.ok_or(CliError::Discarded)? {
        LoadState::Ready(items) => print_json(&serde_json::to_value(items)?),
        LoadState::Failed(err) => Err(err.into()),
        LoadState::Loading => Err(CliError::Discarded),
    }
}

fn project_input(fields: ProjectFields) -> Result<ProjectInput, CliError> {
    let input = ProjectInput {
        name: fields.name,
        status: fields.status,
        details: fields.details,
        customer_id: fields.customer_id,
    };
    input.validate().map_err(invalid)?;
    Ok(input)
}

fn invalid(errors: Vec<FieldError>) -> CliError {
    let joined = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    CliError::Invalid(joined)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
