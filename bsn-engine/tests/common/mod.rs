// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use bsn_engine::app::{AppContext, Application, TimerId};
use bsn_engine::packet::AmPacket;
use bsn_engine::types::BROADCAST_ADDR;

pub const AM_TEST: u8 = 6;

/// Reports its boot and every packet it hears. Node 0 broadcasts its id once
/// it has booted.
pub struct Chatty;

impl Application for Chatty {
    fn booted(&mut self, ctx: &mut AppContext) {
        let id = ctx.id();
        ctx.dbg("main", format_args!("booted"));
        if id == 0 {
            ctx.send(BROADCAST_ADDR, AM_TEST, vec![id as u8]);
        }
    }

    fn timer_fired(&mut self, _ctx: &mut AppContext, _timer: TimerId) {}

    fn received(&mut self, ctx: &mut AppContext, packet: &AmPacket) {
        ctx.dbg(
            "app_out",
            format_args!(
                "received {} bytes from {}",
                packet.payload.len(),
                packet.src
            ),
        );
    }
}

/// Starts two timers on boot. When timer 1 fires timer 0 is either restarted
/// or stopped.
pub struct Timers {
    pub restart: bool,
}

impl Application for Timers {
    fn booted(&mut self, ctx: &mut AppContext) {
        ctx.start_timer_ms(0, 100);
        ctx.start_timer_ms(1, 50);
    }

    fn timer_fired(&mut self, ctx: &mut AppContext, timer: TimerId) {
        let now = ctx.now_ms();
        ctx.dbg("main", format_args!("timer {timer} at {now}"));
        if timer == 1 {
            if self.restart {
                ctx.start_timer_ms(0, 200);
            } else {
                ctx.stop_timer(0);
            }
        }
    }

    fn received(&mut self, _ctx: &mut AppContext, _packet: &AmPacket) {}
}

/// Writes two bytes to the serial port on boot.
pub struct SerialWriter;

impl Application for SerialWriter {
    fn booted(&mut self, ctx: &mut AppContext) {
        ctx.serial_send(0x89, vec![0x12, 0x34]);
        ctx.dbg("main,app_out", format_args!("serial sent"));
    }

    fn timer_fired(&mut self, _ctx: &mut AppContext, _timer: TimerId) {}

    fn received(&mut self, _ctx: &mut AppContext, _packet: &AmPacket) {}
}
