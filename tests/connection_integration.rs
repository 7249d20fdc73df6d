//! Full-link integration: two connections wired back to back.
//!
//! Messages travel as raw bytes between a host-side and a surface-side
//! connection, exercising the event pump, the ping exchange, and the
//! mirrored surface-state model together.

use hui::prelude::*;
use hui::StripControl;

fn link() -> (HuiConnection, HuiConnection) {
    let host = HuiConnection::new(ConnectionConfig {
        role: Role::Host,
        ..ConnectionConfig::default()
    });
    let surface = HuiConnection::new(ConnectionConfig {
        role: Role::Surface,
        ..ConnectionConfig::default()
    });
    (host, surface)
}

/// Move every queued outbound message across the "wire" as raw bytes.
fn relay(from: &HuiConnection, to: &mut HuiConnection) {
    for message in from.outbound().try_iter() {
        to.feed_bytes(&message.to_bytes());
    }
}

#[test]
fn mixer_scene_reaches_the_surface_model() {
    let (host, mut surface) = link();
    let mut model = SurfaceState::new();

    host.send_switch(
        Switch::Strip {
            channel: 0,
            control: StripControl::Mute,
        },
        true,
    );
    host.send_fader_level(0, 10000);
    host.send_meter(0, MeterSide::Right, 7);
    host.send_small_display(&SmallDisplay::new(SmallDisplayTarget::Strip(0), "Drum"));
    host.send_large_display(&[
        LargeDisplaySlice::new(0, "Session A "),
        LargeDisplaySlice::new(4, "24 bit    "),
    ]);
    host.send_time_display(&TimeDisplay::parse("00:01:23:11"));

    relay(&host, &mut surface);
    for event in surface.events().try_iter() {
        model.apply(&event);
    }

    assert!(model.switch(Switch::Strip {
        channel: 0,
        control: StripControl::Mute,
    }));
    assert_eq!(model.fader(0), 10000);
    assert_eq!(model.meter(0, MeterSide::Right), 7);
    assert_eq!(model.small_display(SmallDisplayTarget::Strip(0)), "Drum");
    assert_eq!(&model.large_display_row(0)[..10], "Session A ");
    assert_eq!(&model.large_display_row(1)[..10], "24 bit    ");
    assert_eq!(format!("{}", model.time_display()), "00.01.23.11");
}

#[test]
fn surface_gestures_reach_the_host() {
    let (mut host, surface) = link();

    surface.send_fader_touch(2, true);
    surface.send_fader_level(2, 4242);
    surface.send_fader_touch(2, false);
    surface.send_vpot(VPot::Strip(2), 0x45);

    relay(&surface, &mut host);
    let events: Vec<ProtocolEvent> = host.events().try_iter().collect();

    assert_eq!(
        events,
        vec![
            ProtocolEvent::FaderTouch {
                channel: 2,
                touched: true,
            },
            ProtocolEvent::FaderLevel {
                channel: 2,
                level: 4242,
            },
            ProtocolEvent::FaderTouch {
                channel: 2,
                touched: false,
            },
            ProtocolEvent::VPotValue {
                vpot: VPot::Strip(2),
                value: 0x45,
            },
        ]
    );
}

#[test]
fn ping_exchange_keeps_both_ends_alive() {
    let (mut host, mut surface) = link();

    assert!(host.tick());
    assert!(surface.tick());
    relay(&host, &mut surface);
    relay(&surface, &mut host);

    let host_events: Vec<_> = host.events().try_iter().collect();
    let surface_events: Vec<_> = surface.events().try_iter().collect();
    assert_eq!(
        host_events,
        vec![ProtocolEvent::Ping {
            from: Role::Surface
        }]
    );
    assert_eq!(
        surface_events,
        vec![ProtocolEvent::Ping { from: Role::Host }]
    );

    assert!(host.is_alive());
    assert!(surface.is_alive());
}

#[test]
fn interleaved_foreign_traffic_does_not_disturb_pairing() {
    let (host, mut surface) = link();

    host.send_switch(Switch::Transport(TransportControl::Record), true);
    let mut wire: Vec<Vec<u8>> = host
        .outbound()
        .try_iter()
        .map(|message| message.to_bytes())
        .collect();
    // A foreign CC lands between the zone byte and the port byte.
    wire.insert(1, vec![0xB0, 0x5B, 0x40]);

    for bytes in &wire {
        surface.feed_bytes(bytes);
    }
    let events: Vec<_> = surface.events().try_iter().collect();
    assert_eq!(
        events,
        vec![ProtocolEvent::SwitchChanged {
            switch: Switch::Transport(TransportControl::Record),
            on: true,
        }]
    );
}
