use std::sync::Arc;

use strsim::levenshtein;
use tokio::runtime::{Builder, Runtime};

use crate::{
    config::{Config, ConfigManager},
    core::{
        services::{
            CategoryService, ExpenseForm, ExpenseService, IncomeForm, IncomeService,
            SummaryService, ValidationRules,
        },
        session::AuthSession,
        sync_store::SyncStore,
    },
    domain::{common::Displayable, IncomeCycle},
    storage::{FileSessionCache, JsonDocumentStore},
    utils::init_tracing_with,
};

use super::{output, CliError, CommandError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "login",
        usage: "login <user-id>",
        summary: "Sign in and load the user's document",
    },
    CommandSpec {
        name: "logout",
        usage: "logout",
        summary: "Sign out and clear local state",
    },
    CommandSpec {
        name: "income",
        usage: "income <amount> <YYYY-MM-DD>",
        summary: "Record income and start a new cycle",
    },
    CommandSpec {
        name: "reset-income",
        usage: "reset-income",
        summary: "Clear the income and start counting expenses from now",
    },
    CommandSpec {
        name: "clear-reset",
        usage: "clear-reset",
        summary: "Drop the reset flag, keeping the window at now",
    },
    CommandSpec {
        name: "category",
        usage: "category <name>",
        summary: "Add a category",
    },
    CommandSpec {
        name: "expense",
        usage: "expense <name> <amount> <category>",
        summary: "Record an expense",
    },
    CommandSpec {
        name: "balance",
        usage: "balance",
        summary: "Show the balance of the current cycle",
    },
    CommandSpec {
        name: "report",
        usage: "report",
        summary: "Show totals over every expense",
    },
    CommandSpec {
        name: "status",
        usage: "status",
        summary: "Show the mirrored state",
    },
    CommandSpec {
        name: "help",
        usage: "help",
        summary: "List commands",
    },
    CommandSpec {
        name: "exit",
        usage: "exit",
        summary: "Leave the shell",
    },
];

fn usage_of(name: &str) -> &'static str {
    COMMANDS
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.usage)
        .unwrap_or("help")
}

/// Owns the runtime, store and session behind the shell.
pub struct ShellContext {
    pub running: bool,
    runtime: Runtime,
    session: AuthSession,
    store: Arc<SyncStore>,
    rules: ValidationRules,
    currency: String,
}

impl ShellContext {
    pub fn new() -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        Self::from_config(&manager, &config)
    }

    pub fn from_config(manager: &ConfigManager, config: &Config) -> Result<Self, CliError> {
        init_tracing_with(&config.log_filter);

        let documents = JsonDocumentStore::new(manager.users_dir(config))?;
        let cache = FileSessionCache::new(manager.session_file(config))?;
        let store = Arc::new(SyncStore::new(Arc::new(documents), Arc::new(cache)));
        let session = AuthSession::new(Arc::clone(&store));
        let runtime = Builder::new_current_thread().enable_all().build()?;

        let context = Self {
            running: true,
            runtime,
            session,
            store,
            rules: ValidationRules::from(config),
            currency: config.currency_label.clone(),
        };

        match context.runtime.block_on(context.session.restore()) {
            Ok(Some(user_id)) => output::info(format!("Restored session for `{}`.", user_id)),
            Ok(None) => {}
            Err(err) => output::warning(format!("Could not restore session: {}", err)),
        }
        Ok(context)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        COMMANDS.iter().map(|spec| spec.name).collect()
    }

    pub fn prompt(&self) -> String {
        match self.store.current_user_id() {
            Some(user_id) => format!("expense({})> ", user_id),
            None => "expense> ".to_string(),
        }
    }

    pub fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        match command {
            "login" => self.login(args),
            "logout" => self.logout(),
            "income" => self.income(args),
            "reset-income" => self.reset_income(),
            "clear-reset" => self.clear_reset(),
            "category" => self.category(args),
            "expense" => self.expense(args),
            "balance" => self.balance(),
            "report" => self.report(),
            "status" => self.status(),
            "help" => {
                self.help();
                Ok(LoopControl::Continue)
            }
            "exit" | "quit" => Ok(LoopControl::Exit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    pub fn report_error(&self, err: CommandError) {
        if let CommandError::Unknown(input) = &err {
            output::error(&err);
            self.suggest(input);
            return;
        }
        output::error(err);
        // the message was shown; do not repeat it on the next command
        self.store.clear_error();
    }

    fn suggest(&self, input: &str) {
        let best = COMMANDS
            .iter()
            .map(|spec| (levenshtein(spec.name, input), spec.name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    fn user(&self) -> Result<String, CommandError> {
        self.store.current_user_id().ok_or(CommandError::NotLoggedIn)
    }

    fn login(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let [user_id] = args else {
            return Err(CommandError::Usage(usage_of("login")));
        };
        self.runtime
            .block_on(self.session.handle_identity(Some(*user_id)))?;
        let state = self.store.snapshot();
        output::success(format!(
            "Logged in as `{}` ({} categories, {} expenses).",
            user_id,
            state.categories.len(),
            state.expenses.len()
        ));
        Ok(LoopControl::Continue)
    }

    fn logout(&mut self) -> Result<LoopControl, CommandError> {
        self.runtime.block_on(self.session.handle_identity(None))?;
        output::success("Logged out.");
        Ok(LoopControl::Continue)
    }

    fn income(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let [amount, date] = args else {
            return Err(CommandError::Usage(usage_of("income")));
        };
        let user_id = self.user()?;
        let form = IncomeForm::new(*amount, *date);
        let income = self.runtime.block_on(IncomeService::submit(
            &self.store,
            &user_id,
            &self.rules,
            &form,
        ))?;
        output::success(format!(
            "Income of {} saved. Next salary on {}.",
            output::money(&self.currency, income.amount),
            income.next_salary_date
        ));
        Ok(LoopControl::Continue)
    }

    fn reset_income(&mut self) -> Result<LoopControl, CommandError> {
        let user_id = self.user()?;
        self.runtime.block_on(self.store.reset_income(&user_id))?;
        output::success("Income reset. Only expenses added from now on count toward the balance.");
        Ok(LoopControl::Continue)
    }

    fn clear_reset(&mut self) -> Result<LoopControl, CommandError> {
        let user_id = self.user()?;
        self.runtime
            .block_on(self.store.clear_expense_ui_reset(&user_id))?;
        output::success("Reset flag cleared.");
        Ok(LoopControl::Continue)
    }

    fn category(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage(usage_of("category")));
        }
        let user_id = self.user()?;
        let raw = args.join(" ");
        let name = self.runtime.block_on(CategoryService::submit(
            &self.store,
            &user_id,
            &self.rules,
            &raw,
        ))?;
        output::success(format!("Category `{}` added.", name));
        Ok(LoopControl::Continue)
    }

    fn expense(&mut self, args: &[&str]) -> Result<LoopControl, CommandError> {
        let [name, amount, category] = args else {
            return Err(CommandError::Usage(usage_of("expense")));
        };
        let user_id = self.user()?;
        let form = ExpenseForm::new(*name, *amount, *category);
        let expense = self
            .runtime
            .block_on(ExpenseService::submit(&self.store, &user_id, &form))?;
        output::success(format!("Expense added: {}", expense.display_label()));
        Ok(LoopControl::Continue)
    }

    fn balance(&self) -> Result<LoopControl, CommandError> {
        self.user()?;
        let state = self.store.snapshot();
        let snapshot = SummaryService::cycle_snapshot(&state);
        output::section("Current cycle");
        let window = match snapshot.cycle {
            IncomeCycle::NoIncome => "no income recorded".to_string(),
            IncomeCycle::ActiveCycle { received_date } => format!("since {}", received_date),
            IncomeCycle::ResetPending { reset_date } => {
                format!("after reset at {}", reset_date.format("%Y-%m-%d %H:%M:%S"))
            }
        };
        output::row("Window", window);
        output::row("Expenses counted", snapshot.in_scope_count);
        match snapshot.balance {
            Some(balance) => {
                output::row("Income", output::money(&self.currency, balance.income));
                output::row("Spent", output::money(&self.currency, balance.spent));
                output::row("Remaining", output::money(&self.currency, balance.remaining));
            }
            None => output::info("Add an income to see the remaining balance."),
        }
        Ok(LoopControl::Continue)
    }

    fn report(&self) -> Result<LoopControl, CommandError> {
        self.user()?;
        let state = self.store.snapshot();
        let totals = SummaryService::totals(&state.expenses);
        output::section("Expenses");
        output::row("Total", output::money(&self.currency, totals.total));
        output::row("Count", totals.count);
        output::row("Average", output::money(&self.currency, totals.average));

        output::section("By category");
        for entry in SummaryService::by_category(&state.expenses) {
            output::row(entry.name, output::money(&self.currency, entry.amount));
        }
        output::section("By month");
        for entry in SummaryService::by_month(&state.expenses) {
            output::row(entry.label, output::money(&self.currency, entry.amount));
        }
        Ok(LoopControl::Continue)
    }

    fn status(&self) -> Result<LoopControl, CommandError> {
        let state = self.store.snapshot();
        output::section("Status");
        output::row("User", state.current_user_id.as_deref().unwrap_or("-"));
        output::row(
            "Income",
            state
                .income
                .as_ref()
                .map(|income| income.display_label())
                .unwrap_or_else(|| "-".into()),
        );
        output::row("Categories", state.categories.join(", "));
        output::row("Expenses", state.expenses.len());
        output::row("Reset pending", state.reset_for_add_expense_ui);
        if let Some(error) = state.error {
            output::row("Last error", error);
        }
        Ok(LoopControl::Continue)
    }

    fn help(&self) {
        output::section("Commands");
        for spec in COMMANDS {
            output::row(spec.usage, spec.summary);
        }
    }
}
