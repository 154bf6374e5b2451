// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Peripheral nodes acquire accelerometer samples on request and answer the
//! central node with a classification.

use bsn_engine::app::{AppContext, Application, TimerId};
use bsn_engine::packet::AmPacket;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::BsnParams;
use crate::classify::classify;
use crate::msg::{AM_BSN_MSG, Activity, BsnMsg, MsgType};

pub const SAMPLE_TIMER: TimerId = 0;
pub const TIMEOUT_TIMER: TimerId = 1;

/// Sample amplitudes of the simulated sensor: still, moving and in crisis.
pub const ACTIVITY_AMPLITUDES: [f64; 3] = [0.3, 2.0, 6.0];

pub struct PeripheralNode {
    params: BsnParams,
    acquiring: Option<u16>,
    last_answered: Option<u16>,
    amplitude: f64,
    samples: Vec<f64>,
}

impl PeripheralNode {
    #[must_use]
    pub fn new(params: BsnParams) -> Self {
        let samples = Vec::with_capacity(params.buf_size);
        Self {
            params,
            acquiring: None,
            last_answered: None,
            amplitude: ACTIVITY_AMPLITUDES[0],
            samples,
        }
    }

    fn start_acquisition(&mut self, ctx: &mut AppContext, msg_id: u16) {
        self.acquiring = Some(msg_id);
        self.samples.clear();
        self.amplitude = *ACTIVITY_AMPLITUDES
            .choose(ctx.rng())
            .unwrap_or(&ACTIVITY_AMPLITUDES[0]);
        ctx.start_timer_ms(SAMPLE_TIMER, self.params.f_acq_ms);
        ctx.start_timer_ms(TIMEOUT_TIMER, self.params.pn_timeout_ms);
    }

    fn acquire(&mut self, ctx: &mut AppContext) {
        let Some(msg_id) = self.acquiring else {
            return;
        };
        let amplitude = self.amplitude;
        let sample = ctx.rng().gen_range(-amplitude..=amplitude);
        self.samples.push(sample);

        if self.samples.len() < self.params.buf_size {
            ctx.start_timer_ms(SAMPLE_TIMER, self.params.f_acq_ms);
            return;
        }

        ctx.stop_timer(TIMEOUT_TIMER);
        let value = classify(&self.samples);
        let response = BsnMsg::response(msg_id, value);
        ctx.send(self.params.central_id, AM_BSN_MSG, response.encode());
        ctx.dbg("info", format_args!("RES {msg_id} sent: {value}"));
        self.last_answered = Some(msg_id);
        self.acquiring = None;
    }
}

impl Application for PeripheralNode {
    fn booted(&mut self, ctx: &mut AppContext) {
        ctx.dbg("main", format_args!("peripheral node booted"));
    }

    fn timer_fired(&mut self, ctx: &mut AppContext, timer: TimerId) {
        match timer {
            SAMPLE_TIMER => self.acquire(ctx),
            TIMEOUT_TIMER => {
                if let Some(msg_id) = self.acquiring.take() {
                    let n = self.samples.len();
                    ctx.stop_timer(SAMPLE_TIMER);
                    ctx.dbg(
                        "warn",
                        format_args!("acquisition {msg_id} timed out after {n} samples"),
                    );
                }
            }
            _ => {}
        }
    }

    fn received(&mut self, ctx: &mut AppContext, packet: &AmPacket) {
        if packet.am_type != AM_BSN_MSG {
            return;
        }
        let msg = match BsnMsg::decode(&packet.payload) {
            Ok(msg) => msg,
            Err(e) => {
                let src = packet.src;
                ctx.dbg("warn", format_args!("dropped message from {src}: {}", e.0));
                return;
            }
        };
        if msg.msg_type != MsgType::Req || msg.value != Activity::Start {
            return;
        }

        let msg_id = msg.msg_id;
        if self.acquiring == Some(msg_id) || self.last_answered == Some(msg_id) {
            ctx.dbg("info", format_args!("duplicate REQ {msg_id} ignored"));
            return;
        }
        ctx.dbg("info", format_args!("REQ {msg_id} received"));
        self.start_acquisition(ctx, msg_id);
    }
}
