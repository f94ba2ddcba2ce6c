//! One complete sync pass against scripted collaborators, no hardware needed.
//!
//! Run with `cargo run --bin demo_host_clock`.

use clock_kit::host::{
    LinkScript, RamClock, ResolveBehavior, ResolverScript, ScriptedLink, ScriptedResolver,
    ScriptedTransport, TransportScript, server_reply,
};
use clock_kit::{
    LinkCredentials, LinkStatus, NtpSeconds, Result, SyncConfig, SyncInbox, TimeSync,
    TimezoneHours, WallClock,
};
use core::net::Ipv4Addr;

const NEW_YEAR_2024: u32 = 3_913_056_000;

fn main() -> Result<()> {
    let inbox = SyncInbox::leaked();
    let link = LinkScript::leaked(&[
        LinkStatus::Connecting,
        LinkStatus::Connecting,
        LinkStatus::Up,
    ]);
    let resolver = ResolverScript::leaked(ResolveBehavior::AnswerNow(Ipv4Addr::new(192, 0, 2, 1)));
    let transport = TransportScript::leaked();

    let config = SyncConfig::new(LinkCredentials::new("shopnet", "vermillion")?);
    let mut time_sync = TimeSync::new(
        inbox,
        ScriptedLink::new(link),
        ScriptedResolver::new(resolver),
        ScriptedTransport::new(transport),
        config,
    );

    let timezone = TimezoneHours::clamped(-5);
    let mut clock = RamClock::default();
    println!("power-on reading: {}", clock.fields());

    // Tick the machine until the request is on the wire.
    let mut ticks = 0u32;
    while transport.last_request().is_none() && ticks < 16 {
        time_sync.poll(&mut clock, timezone);
        println!("tick {ticks}: {}", time_sync.status());
        ticks = ticks.saturating_add(1);
    }

    // Play the server's part: a stratum-2 reply carrying new year 2024 UTC.
    transport.inject(&server_reply(NtpSeconds(NEW_YEAR_2024), 2), 123);
    if time_sync.poll(&mut clock, timezone) {
        println!("synchronized ({timezone}): {}", clock.fields());
    }
    // From here a real caller keeps polling, roughly hourly, for fresh time.

    // The clock-face buttons step the display by whole hours.
    clock.adjust_hours(1)?;
    println!("stepped one hour east: {}", clock.fields());
    clock.adjust_hours(-1)?;
    println!("stepped back west:     {}", clock.fields());

    Ok(())
}
