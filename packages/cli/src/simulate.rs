//! Simulated trip replay.
//!
//! Drives a [`PositionSimulator`] on a fixed interval, feeds each position
//! to the traveller's monitor in a [`Fleet`], and prints what changed. Time
//! is simulated: each tick advances the clock by `--tick-minutes`, so
//! check-in deadlines elapse without waiting for them. With `--advise`,
//! every admitted advisory request runs as its own task so slow providers
//! never stall the position feed; results come back over a channel and
//! release the monitor's gate.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use clap::Args;
use tokio::sync::mpsc;
use tourist_safety_advisory::providers::{LlmProvider, create_provider_from_env};
use tourist_safety_advisory::{
    AdvisoryError, DEFAULT_TIMEOUT, RiskZoneAlertOutput, analyze_route_deviation,
    generate_risk_zone_alert,
};
use tourist_safety_geofence::SafetyTransition;
use tourist_safety_monitor::{
    AdvisoryRequest, Bounds, Fleet, FleetAlert, PositionSimulator, SafetyMonitor, SimulatorConfig,
};
use tourist_safety_scenario::Scenario;

/// Options for the `simulate` subcommand.
#[derive(Args)]
pub struct SimulateArgs {
    /// Number of position updates
    #[arg(long, default_value = "60")]
    ticks: u32,
    /// Random seed for the jitter
    #[arg(long, default_value = "42")]
    seed: u64,
    /// Distance advanced along the route per tick, in meters
    #[arg(long, default_value = "5000")]
    step_m: f64,
    /// Maximum random offset per axis per tick, in degrees
    #[arg(long, default_value = "0.05")]
    jitter_deg: f64,
    /// Delay between ticks, in milliseconds
    #[arg(long, default_value = "250")]
    interval_ms: u64,
    /// Clamp positions to the north-east India monitoring box
    #[arg(long)]
    clamp: bool,
    /// Request LLM advisories for risk-zone entries and a final route analysis
    #[arg(long)]
    advise: bool,
    /// Seconds to wait for each advisory
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_s: u64,
    /// Identifier reported in the route analysis
    #[arg(long, default_value = "T-001")]
    tourist_id: String,
    /// Name shown in operator alerts
    #[arg(long, default_value = "Traveller")]
    tourist_name: String,
    /// Simulated minutes that pass per tick
    #[arg(long, default_value = "1")]
    tick_minutes: u32,
    /// Expect a check-in every this many simulated minutes
    #[arg(long)]
    check_in_min: Option<u32>,
    /// Confirm a check-in every this many ticks; never when omitted
    #[arg(long, requires = "check_in_min")]
    check_in_every: Option<u32>,
    /// Trigger an SOS at this tick
    #[arg(long)]
    sos_at: Option<u32>,
}

type AdvisoryResult = (String, Result<RiskZoneAlertOutput, AdvisoryError>);

/// Replays the trip for `args.ticks` ticks or until the destination is
/// reached, then prints the alert feed and, with `--advise`, a route
/// analysis.
///
/// # Errors
///
/// Fails if the simulator or check-in settings are invalid, or if
/// `--advise` is set and no LLM provider is configured.
pub async fn run(
    scenario: Scenario,
    args: &SimulateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider: Option<Arc<dyn LlmProvider>> = if args.advise {
        Some(Arc::from(create_provider_from_env()?))
    } else {
        None
    };
    let timeout = Duration::from_secs(args.timeout_s);

    let config = SimulatorConfig {
        step_m: args.step_m,
        jitter_deg: args.jitter_deg,
        bounds: args.clamp.then_some(Bounds::NORTHEAST_INDIA),
    };
    let mut simulator = PositionSimulator::new(scenario.route(), config, args.seed)?;
    println!(
        "Simulating '{}' for {} ticks (seed {})",
        scenario.name(),
        args.ticks,
        args.seed
    );

    let id = args.tourist_id.as_str();
    let start = Utc::now();
    let mut fleet = Fleet::new();
    fleet.register(id, args.tourist_name.as_str(), SafetyMonitor::new(scenario))?;
    if let Some(minutes) = args.check_in_min {
        let interval =
            TimeDelta::try_minutes(i64::from(minutes)).ok_or("check-in interval out of range")?;
        fleet.monitor_mut(id)?.enable_check_ins(interval, start)?;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<AdvisoryResult>();
    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));

    for tick in 1..=args.ticks {
        interval.tick().await;

        let now = clock(start, tick, args.tick_minutes).ok_or("simulated clock out of range")?;
        if args.check_in_every.is_some_and(|every| every > 0 && tick % every == 0) {
            fleet.check_in(id, now)?;
        }
        if args.sos_at == Some(tick) {
            print_feed_entry(fleet.trigger_sos(id, now)?);
        }

        let position = simulator.next_position();
        let outcome = fleet.update(id, position, now)?;
        let snapshot = &outcome.snapshot;

        println!(
            "[{tick:>4}] {position}  zone={:<20} score={:>2}/10  route={:>6.2}km{}",
            snapshot.zone.as_ref().map_or("-", |z| z.id.as_str()),
            snapshot.score,
            snapshot.distance_to_route_m() / 1000.0,
            if snapshot.deviated { "  DEVIATED" } else { "" }
        );
        for transition in &outcome.transitions {
            print_transition(transition);
        }
        let fresh: Vec<&FleetAlert> = fleet.alerts().take(outcome.alerts.len()).collect();
        for entry in fresh.into_iter().rev() {
            print_feed_entry(entry);
        }

        for request in outcome.advisory_requests {
            match &provider {
                Some(provider) => {
                    spawn_advisory(Arc::clone(provider), request, timeout, tx.clone());
                }
                None => fleet.advisory_finished(id, &request.zone_id)?,
            }
        }

        while let Ok((zone_id, result)) = rx.try_recv() {
            report_advisory(&zone_id, result);
            fleet.advisory_finished(id, &zone_id)?;
        }

        if simulator.is_finished() {
            log::info!("Reached destination after {tick} ticks");
            break;
        }
    }

    drop(tx);
    while let Some((zone_id, result)) = rx.recv().await {
        report_advisory(&zone_id, result);
        fleet.advisory_finished(id, &zone_id)?;
    }

    let Some(tourist) = fleet.get(id) else {
        return Ok(());
    };
    println!();
    println!("Status: {}", tourist.status());
    println!("Alerts ({}):", fleet.alerts().count());
    for entry in fleet.alerts() {
        println!(
            "  {} {:<8} {}",
            entry.alert.timestamp.format("%H:%M"),
            entry.alert.tier,
            entry.headline
        );
    }

    if let Some(provider) = &provider {
        let input = tourist.monitor().route_deviation_input(id);
        match analyze_route_deviation(provider.as_ref(), &input, timeout).await {
            Ok(analysis) => {
                println!();
                println!(
                    "Route analysis: {}",
                    if analysis.is_deviation {
                        "deviation detected"
                    } else {
                        "no deviation"
                    }
                );
                println!("  Details: {}", analysis.deviation_details);
                println!("  Risk:    {}", analysis.risk_assessment);
            }
            Err(e) => log::warn!("Route analysis failed: {e}"),
        }
    }

    Ok(())
}

/// Simulated time at `tick`, or `None` if it overflows.
fn clock(start: DateTime<Utc>, tick: u32, tick_minutes: u32) -> Option<DateTime<Utc>> {
    let minutes = i64::from(tick).checked_mul(i64::from(tick_minutes))?;
    start.checked_add_signed(TimeDelta::try_minutes(minutes)?)
}

fn print_feed_entry(entry: &FleetAlert) {
    println!("       [{}] {}", entry.alert.tier, entry.headline);
}

fn spawn_advisory(
    provider: Arc<dyn LlmProvider>,
    request: AdvisoryRequest,
    timeout: Duration,
    tx: mpsc::UnboundedSender<AdvisoryResult>,
) {
    tokio::spawn(async move {
        let result = generate_risk_zone_alert(provider.as_ref(), &request.input, timeout).await;
        if tx.send((request.zone_id, result)).is_err() {
            log::debug!("Advisory finished after the simulation ended");
        }
    });
}

fn print_transition(transition: &SafetyTransition) {
    match transition {
        SafetyTransition::ZoneEntered { zone } => {
            println!("       -> entered {} ({} risk)", zone.name, zone.risk_level);
        }
        SafetyTransition::ZoneExited { zone } => println!("       <- left {}", zone.name),
        SafetyTransition::DeviationStarted { distance_m } => {
            println!("       !! off route by {:.2} km", distance_m / 1000.0);
        }
        SafetyTransition::DeviationCleared { .. } => println!("       ok back on route"),
    }
}

fn report_advisory(zone_id: &str, result: Result<RiskZoneAlertOutput, AdvisoryError>) {
    match result {
        Ok(advice) => {
            println!("       ** advisory for {zone_id}: {}", advice.alert_message);
            for action in &advice.recommended_actions {
                println!("          - {action}");
            }
        }
        Err(e) => log::warn!("Advisory for zone '{zone_id}' failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn clock_advances_per_tick() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(clock(start, 0, 5), Some(start));
        assert_eq!(
            clock(start, 3, 5),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 15, 0).unwrap())
        );
        assert_eq!(clock(start, u32::MAX, u32::MAX), None);
    }
}
