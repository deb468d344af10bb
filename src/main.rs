// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use cidry::{
    constants::{
        ERROR_REQUEUE_DURATION_SECS, SETTLED_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS,
        UNSETTLED_REQUEUE_DURATION_SECS,
    },
    crd::{NetworkGlobal, Subnet, SubnetPhase},
    reconcilers::{reconcile_networkglobal, reconcile_subnet},
};
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("cidry-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug cargo run
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json cargo run
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting cidry IPAM Controller");
    debug!("Logging initialized with file and line number tracking");

    // Initialize Kubernetes client
    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    info!("Starting all controllers");

    // Run controllers concurrently
    // Controllers should never exit - if one fails, we log it and exit the main process
    tokio::select! {
        result = run_networkglobal_controller(client.clone()) => {
            error!("CRITICAL: NetworkGlobal controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("NetworkGlobal controller exited unexpectedly without error")
        }
        result = run_subnet_controller(client.clone()) => {
            error!("CRITICAL: Subnet controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Subnet controller exited unexpectedly without error")
        }
    }
}

/// Run the `Subnet` controller
async fn run_subnet_controller(client: Client) -> Result<()> {
    info!("Starting Subnet controller");

    let api = Api::<Subnet>::all(client.clone());

    Controller::new(api, Config::default())
        .run(reconcile_subnet_wrapper, error_policy, Arc::new(client))
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `NetworkGlobal` controller
async fn run_networkglobal_controller(client: Client) -> Result<()> {
    info!("Starting NetworkGlobal controller");

    let api = Api::<NetworkGlobal>::all(client.clone());

    Controller::new(api, Config::default())
        .run(
            reconcile_networkglobal_wrapper,
            error_policy,
            Arc::new(client),
        )
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `Subnet`
async fn reconcile_subnet_wrapper(
    subnet: Arc<Subnet>,
    ctx: Arc<Client>,
) -> Result<Action, ReconcileError> {
    debug!(
        subnet_name = %subnet.name_any(),
        namespace = ?subnet.namespace(),
        "Reconcile wrapper called for Subnet"
    );

    match reconcile_subnet((*ctx).clone(), (*subnet).clone()).await {
        Ok(()) => {
            info!("Successfully reconciled Subnet: {}", subnet.name_any());

            // Settled subnets (Active or terminally Rejected) are checked
            // less frequently; everything else is still converging
            let is_settled = matches!(
                subnet.phase(),
                Some(SubnetPhase::Active | SubnetPhase::Rejected)
            );

            if is_settled {
                debug!("Subnet settled, requeueing in 5 minutes");
                Ok(Action::requeue(Duration::from_secs(
                    SETTLED_REQUEUE_DURATION_SECS,
                )))
            } else {
                debug!("Subnet not settled, requeueing in 30 seconds");
                Ok(Action::requeue(Duration::from_secs(
                    UNSETTLED_REQUEUE_DURATION_SECS,
                )))
            }
        }
        Err(e) => {
            error!("Failed to reconcile Subnet: {}", e);
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for `NetworkGlobal`
async fn reconcile_networkglobal_wrapper(
    global: Arc<NetworkGlobal>,
    ctx: Arc<Client>,
) -> Result<Action, ReconcileError> {
    match reconcile_networkglobal((*ctx).clone(), (*global).clone()).await {
        Ok(()) => {
            info!(
                "Successfully reconciled NetworkGlobal: {}",
                global.name_any()
            );

            // A deleting root is re-checked frequently so the finalizer is
            // released soon after the last member subnet disappears
            if global.metadata.deletion_timestamp.is_some() {
                Ok(Action::requeue(Duration::from_secs(
                    UNSETTLED_REQUEUE_DURATION_SECS,
                )))
            } else {
                Ok(Action::requeue(Duration::from_secs(
                    SETTLED_REQUEUE_DURATION_SECS,
                )))
            }
        }
        Err(e) => {
            error!("Failed to reconcile NetworkGlobal: {}", e);
            Err(e.into())
        }
    }
}

/// Error policy for controller
fn error_policy(
    _resource: Arc<impl std::fmt::Debug>,
    _err: &ReconcileError,
    _ctx: Arc<Client>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
