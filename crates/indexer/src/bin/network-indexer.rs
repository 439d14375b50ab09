// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{bail, Result};
use clap::Parser;
use network_indexer::{chain::ContractAddresses, IndexerService, IndexerServiceConfig};
use url::Url;

/// Arguments of the indexer.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct MainArgs {
    /// URL of the Ethereum RPC endpoint.
    #[clap(short, long, env)]
    rpc_url: Url,
    /// DB connection string.
    #[clap(long, env = "DATABASE_URL")]
    db: String,
    /// Address of the EraManager contract.
    #[clap(long, env)]
    era_manager_address: Address,
    /// Address of the Staking contract.
    #[clap(long, env)]
    staking_address: Address,
    /// Address of the IndexerRegistry contract.
    #[clap(long, env)]
    indexer_registry_address: Address,
    /// Address of the RewardsDistributor contract.
    #[clap(long, env)]
    rewards_distributor_address: Address,
    /// Address of the RewardsBooster contract.
    #[clap(long, env)]
    rewards_booster_address: Address,
    /// Starting block number.
    #[clap(long)]
    start_block: Option<u64>,
    /// Ending block number (if set, indexer will process up to this block and exit).
    #[clap(long)]
    end_block: Option<u64>,
    /// Interval in seconds between checking for new events.
    #[clap(long, default_value = "3")]
    interval: u64,
    /// Number of retries before quitting after an error.
    #[clap(long, default_value = "10")]
    retries: u32,
    /// Number of blocks to process in each batch.
    #[clap(long, default_value = "500")]
    batch_size: u64,
    /// Expected chain id; the indexer refuses to start on any other chain.
    #[clap(long, env)]
    chain_id: Option<u64>,
    /// Whether to log in JSON format.
    #[clap(long, env, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = MainArgs::parse();

    if args.log_json {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let config = IndexerServiceConfig {
        interval: Duration::from_secs(args.interval),
        retries: args.retries,
        batch_size: args.batch_size,
    };
    let addresses = ContractAddresses {
        era_manager: args.era_manager_address,
        staking: args.staking_address,
        indexer_registry: args.indexer_registry_address,
        rewards_distributor: args.rewards_distributor_address,
        rewards_booster: args.rewards_booster_address,
    };

    let mut indexer_service =
        IndexerService::new(args.rpc_url, addresses, &args.db, config, args.chain_id).await?;

    if let Err(err) = indexer_service.run(args.start_block, args.end_block).await {
        bail!("FATAL: Error running the indexer: {err}");
    }

    Ok(())
}
