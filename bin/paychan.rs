use std::path::PathBuf;

use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

use paychan::{
    events::{ContractEvent, DecodedEvent},
    interface::{EVENTS, FUNCTIONS},
    utils::{format_units, hex_encode, parse_amount},
    CallOverrides, Overrides, PayableOverrides, PaymentChannelClient, Settings, TypedEventFilter,
};

#[derive(Debug, Parser)]
#[clap(
    name = "paychan",
    version,
    about = "Client for the PaymentChannel contract",
    long_about = r#"Sends transactions to a deployed PaymentChannel contract and follows its events"#
)]
struct Cli {
    #[clap(
        long,
        env = "PAYCHAN_CONFIG",
        help = "Path to the configuration file (defaults to ./config.{yaml,toml,json})"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the balance held by the contract for an address
    Balance {
        addr: Address,
        #[clap(long, help = "Block number to read the balance at")]
        block: Option<u64>,
    },
    /// Send a transaction and wait for its receipt (view functions are rejected)
    Send {
        #[command(subcommand)]
        function: Function,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Run a function as a read-only call and print its return value
    Call {
        #[command(subcommand)]
        function: Function,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Estimate the gas a function would use
    Estimate {
        #[command(subcommand)]
        function: Function,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Print the unsigned transaction request for a function as JSON
    Populate {
        #[command(subcommand)]
        function: Function,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Print past events
    Events {
        #[command(flatten)]
        filter: EventArgs,
        #[clap(long, default_value_t = 0)]
        from_block: u64,
        #[clap(long, help = "Last block to include (defaults to latest)")]
        to_block: Option<u64>,
    },
    /// Print new events as they are mined, until interrupted
    Watch {
        #[command(flatten)]
        filter: EventArgs,
        #[clap(long, help = "Replay from this block before following the head")]
        from_block: Option<u64>,
    },
    /// Print function selectors and event topics
    Abi,
}

#[derive(Debug, Clone, Subcommand)]
enum Function {
    /// deposit() payable
    Deposit {
        #[clap(value_parser = parse_amount, help = "Wei to deposit, or e.g. 0.1ether")]
        amount: U256,
    },
    /// getBalance(address)
    GetBalance { addr: Address },
    /// testCreate()
    TestCreate,
    /// transfer(address,uint256)
    Transfer {
        dest: Address,
        #[clap(value_parser = parse_amount)]
        amount: U256,
    },
    /// transferFib(address,uint256)
    TransferFib {
        dest: Address,
        #[clap(value_parser = parse_amount)]
        count: U256,
    },
    /// withdraw(uint256)
    Withdraw {
        #[clap(value_parser = parse_amount)]
        amount: U256,
    },
}

#[derive(Debug, Clone, Args)]
struct TxArgs {
    #[clap(long, help = "Sender address (defaults to the configured signer)")]
    from: Option<Address>,
    #[clap(long)]
    gas_limit: Option<u64>,
    #[clap(long, value_parser = parse_gas_price, help = "Gas price in wei, or e.g. 20gwei")]
    gas_price: Option<u128>,
    #[clap(long)]
    nonce: Option<u64>,
    #[clap(long, help = "Block number for read-only calls")]
    block: Option<u64>,
}

impl TxArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            from: self.from,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            nonce: self.nonce,
        }
    }

    fn call_overrides(&self, value: Option<U256>) -> CallOverrides {
        CallOverrides {
            overrides: self.overrides(),
            value,
            block: self.block.map(BlockId::number),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EventKind {
    All,
    Deposited,
    Transfer,
    Withdrawn,
}

#[derive(Debug, Clone, Args)]
struct EventArgs {
    #[clap(long, value_enum, default_value_t = EventKind::All)]
    event: EventKind,
    #[clap(long, help = "Only Deposited/Withdrawn events for this payee")]
    payee: Option<Address>,
    #[clap(long = "sender", help = "Only Transfer events from this address")]
    sender: Option<Address>,
    #[clap(long = "recipient", help = "Only Transfer events to this address")]
    recipient: Option<Address>,
}

fn parse_gas_price(input: &str) -> Result<u128> {
    let value = parse_amount(input)?;
    u128::try_from(value).context("Gas price does not fit in 128 bits")
}

#[tokio::main()]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Settings::new().context(
            "Failed to load configuration. Provide config.yaml or PAYCHAN__* environment variables",
        )?,
    };

    SimpleLogger::new()
        .with_level(settings.level_filter()?)
        .init()
        .context("Failed to initialise logger")?;

    let client = PaymentChannelClient::from_settings(&settings)?;

    run(cli.command, &client).await
}

async fn run(command: Command, client: &PaymentChannelClient) -> Result<()> {
    match command {
        Command::Balance { addr, block } => {
            let overrides = CallOverrides {
                block: block.map(BlockId::number),
                ..Default::default()
            };
            let balance = client.get_balance(addr, &overrides).await?;
            println!("{} wei ({} ether)", balance, format_units(balance, 18));
        },
        Command::Send { function, tx } => send(client, function, &tx).await?,
        Command::Call { function, tx } => call(client, function, &tx).await?,
        Command::Estimate { function, tx } => estimate(client, function, &tx).await?,
        Command::Populate { function, tx } => {
            let request = populate(client, function, &tx);
            println!("{}", serde_json::to_string_pretty(&request)?);
        },
        Command::Events {
            filter,
            from_block,
            to_block,
        } => match filter.event {
            EventKind::All => {
                print_past(client, &client.all_events_filter(), from_block, to_block).await?
            },
            EventKind::Deposited => {
                print_past(client, &client.deposited_filter(filter.payee), from_block, to_block)
                    .await?
            },
            EventKind::Transfer => {
                let typed = client.transfer_filter(filter.sender, filter.recipient);
                print_past(client, &typed, from_block, to_block).await?
            },
            EventKind::Withdrawn => {
                print_past(client, &client.withdrawn_filter(filter.payee), from_block, to_block)
                    .await?
            },
        },
        Command::Watch { filter, from_block } => match filter.event {
            EventKind::All => watch(client, client.all_events_filter(), from_block).await?,
            EventKind::Deposited => {
                watch(client, client.deposited_filter(filter.payee), from_block).await?
            },
            EventKind::Transfer => {
                let typed = client.transfer_filter(filter.sender, filter.recipient);
                watch(client, typed, from_block).await?
            },
            EventKind::Withdrawn => {
                watch(client, client.withdrawn_filter(filter.payee), from_block).await?
            },
        },
        Command::Abi => {
            for (name, signature, selector) in FUNCTIONS {
                println!("function {:<12} {:<32} {}", name, signature, hex_encode(&selector));
            }
            for (name, signature, topic) in EVENTS {
                println!("event    {:<12} {:<32} {}", name, signature, topic);
            }
        },
    }

    Ok(())
}

async fn send(client: &PaymentChannelClient, function: Function, tx: &TxArgs) -> Result<()> {
    let overrides = tx.overrides();
    let outcome = match function {
        Function::Deposit { amount } => {
            let payable = PayableOverrides {
                overrides,
                value: Some(amount),
            };
            client.deposit(&payable).await?
        },
        Function::GetBalance { .. } => {
            bail!("getBalance is a view function; use `call get-balance` or `balance`")
        },
        Function::TestCreate => client.test_create(&overrides).await?,
        Function::Transfer { dest, amount } => client.transfer(dest, amount, &overrides).await?,
        Function::TransferFib { dest, count } => {
            client.transfer_fib(dest, count, &overrides).await?
        },
        Function::Withdraw { amount } => client.withdraw(amount, &overrides).await?,
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn call(client: &PaymentChannelClient, function: Function, tx: &TxArgs) -> Result<()> {
    let statics = client.call_static();
    match function {
        Function::Deposit { amount } => {
            statics.deposit(&tx.call_overrides(Some(amount))).await?;
            println!("ok");
        },
        Function::GetBalance { addr } => {
            println!("{}", statics.get_balance(addr, &tx.call_overrides(None)).await?);
        },
        Function::TestCreate => {
            println!("{}", statics.test_create(&tx.call_overrides(None)).await?);
        },
        Function::Transfer { dest, amount } => {
            statics.transfer(dest, amount, &tx.call_overrides(None)).await?;
            println!("ok");
        },
        Function::TransferFib { dest, count } => {
            statics.transfer_fib(dest, count, &tx.call_overrides(None)).await?;
            println!("ok");
        },
        Function::Withdraw { amount } => {
            statics.withdraw(amount, &tx.call_overrides(None)).await?;
            println!("ok");
        },
    }
    Ok(())
}

async fn estimate(client: &PaymentChannelClient, function: Function, tx: &TxArgs) -> Result<()> {
    let gas = client.estimate_gas();
    let overrides = tx.overrides();
    let estimate = match function {
        Function::Deposit { amount } => {
            let payable = PayableOverrides {
                overrides,
                value: Some(amount),
            };
            gas.deposit(&payable).await?
        },
        Function::GetBalance { addr } => gas.get_balance(addr, &tx.call_overrides(None)).await?,
        Function::TestCreate => gas.test_create(&overrides).await?,
        Function::Transfer { dest, amount } => gas.transfer(dest, amount, &overrides).await?,
        Function::TransferFib { dest, count } => gas.transfer_fib(dest, count, &overrides).await?,
        Function::Withdraw { amount } => gas.withdraw(amount, &overrides).await?,
    };

    println!("{estimate}");
    Ok(())
}

fn populate(
    client: &PaymentChannelClient,
    function: Function,
    tx: &TxArgs,
) -> alloy::rpc::types::TransactionRequest {
    let populate = client.populate_transaction();
    let overrides = tx.overrides();
    match function {
        Function::Deposit { amount } => populate.deposit(&PayableOverrides {
            overrides,
            value: Some(amount),
        }),
        Function::GetBalance { addr } => populate.get_balance(addr, &tx.call_overrides(None)),
        Function::TestCreate => populate.test_create(&overrides),
        Function::Transfer { dest, amount } => populate.transfer(dest, amount, &overrides),
        Function::TransferFib { dest, count } => populate.transfer_fib(dest, count, &overrides),
        Function::Withdraw { amount } => populate.withdraw(amount, &overrides),
    }
}

fn print_event<E: std::fmt::Debug>(decoded: &DecodedEvent<E>) {
    println!(
        "block {} tx {} log {} {:?}",
        decoded.block_number.map(|b| b.to_string()).unwrap_or_else(|| "-".into()),
        decoded
            .tx_hash
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-".into()),
        decoded.log_index.map(|i| i.to_string()).unwrap_or_else(|| "-".into()),
        decoded.event
    );
}

async fn print_past<E: ContractEvent + std::fmt::Debug>(
    client: &PaymentChannelClient,
    filter: &TypedEventFilter<E>,
    from_block: u64,
    to_block: Option<u64>,
) -> Result<()> {
    let events = client.query_filter(filter, from_block, to_block).await?;
    for decoded in &events {
        print_event(decoded);
    }
    info!("{} event(s)", events.len());
    Ok(())
}

async fn watch<E: ContractEvent + std::fmt::Debug>(
    client: &PaymentChannelClient,
    filter: TypedEventFilter<E>,
    from_block: Option<u64>,
) -> Result<()> {
    let mut watcher = client.watch(filter);
    if let Some(block) = from_block {
        watcher = watcher.from_block(block);
    }

    let cancellation_token = CancellationToken::new();
    let (mut receiver, handle) = watcher.spawn(cancellation_token.child_token());

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Watching events on {}. Press Ctrl+C to stop.", client.address());

    loop {
        #[cfg(unix)]
        let terminate = sigterm_stream.recv();
        #[cfg(not(unix))]
        let terminate = std::future::pending::<Option<()>>();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
                break;
            },
            _ = terminate => {
                info!("Received SIGTERM, exiting gracefully...");
                break;
            },
            event = receiver.recv() => match event {
                Some(decoded) => print_event(&decoded),
                None => break,
            },
        }
    }

    cancellation_token.cancel();
    drop(receiver);
    handle.await.context("Event watcher task panicked")??;
    Ok(())
}
