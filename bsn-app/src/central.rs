// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The central node collects one classification per peripheral node each
//! round and decides the wearer's activity.

use std::collections::BTreeMap;

use bsn_engine::app::{AppContext, Application, TimerId};
use bsn_engine::packet::AmPacket;
use bsn_engine::types::{BROADCAST_ADDR, NodeId};

use crate::BsnParams;
use crate::classify::decide;
use crate::msg::{AM_BSN_MSG, AM_TEST_SERIAL_MSG, Activity, BsnMsg, MsgType, TestSerialMsg};

pub const ROUND_TIMER: TimerId = 0;
pub const TIMEOUT_TIMER: TimerId = 1;
/// Guards a request that no peripheral node answers.
pub const REQUEST_TIMER: TimerId = 2;

pub struct CentralNode {
    params: BsnParams,
    msg_id: u16,
    collecting: bool,
    responses: BTreeMap<NodeId, Activity>,
    rounds_decided: u64,
    rounds_aborted: u64,
}

impl CentralNode {
    #[must_use]
    pub fn new(params: BsnParams) -> Self {
        Self {
            params,
            msg_id: 0,
            collecting: false,
            responses: BTreeMap::new(),
            rounds_decided: 0,
            rounds_aborted: 0,
        }
    }

    #[must_use]
    pub fn rounds_decided(&self) -> u64 {
        self.rounds_decided
    }

    #[must_use]
    pub fn rounds_aborted(&self) -> u64 {
        self.rounds_aborted
    }

    fn start_round(&mut self, ctx: &mut AppContext) {
        self.msg_id = self.msg_id.wrapping_add(1);
        self.responses.clear();
        self.collecting = true;
        ctx.send(BROADCAST_ADDR, AM_BSN_MSG, BsnMsg::request(self.msg_id).encode());
        ctx.start_timer_ms(REQUEST_TIMER, self.params.cn_timeout_ms);
        let id = self.msg_id;
        ctx.dbg("info", format_args!("REQ {id} sent"));
    }

    fn abort_round(&mut self, ctx: &mut AppContext) {
        self.rounds_aborted += 1;
        self.collecting = false;
        let id = self.msg_id;
        let received = self.responses.len();
        let expected = self.params.n_pns;
        ctx.dbg(
            "warn",
            format_args!("round {id} aborted with {received}/{expected} classifications"),
        );
        self.responses.clear();
        ctx.start_timer_ms(ROUND_TIMER, self.params.round_pause_ms);
    }

    fn finish_round(&mut self, ctx: &mut AppContext) {
        ctx.stop_timer(TIMEOUT_TIMER);
        self.collecting = false;
        if let Some(decision) = decide(self.responses.values()) {
            self.rounds_decided += 1;
            let id = self.msg_id;
            ctx.dbg("app_out", format_args!("round {id} decision: {decision}"));
            let report = TestSerialMsg {
                sample_value: decision as u16,
            };
            ctx.serial_send(AM_TEST_SERIAL_MSG, report.encode());
        }
        ctx.start_timer_ms(ROUND_TIMER, self.params.round_pause_ms);
    }
}

impl Application for CentralNode {
    fn booted(&mut self, ctx: &mut AppContext) {
        ctx.dbg("main", format_args!("central node booted"));
        ctx.start_timer_ms(ROUND_TIMER, self.params.start_delay_ms);
    }

    fn timer_fired(&mut self, ctx: &mut AppContext, timer: TimerId) {
        match timer {
            ROUND_TIMER => self.start_round(ctx),
            TIMEOUT_TIMER | REQUEST_TIMER => self.abort_round(ctx),
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
        if msg.msg_type != MsgType::Res {
            return;
        }

        let src = packet.src;
        if !self.collecting || msg.msg_id != self.msg_id {
            let id = msg.msg_id;
            ctx.dbg("info", format_args!("stale RES {id} from {src} ignored"));
            return;
        }
        if self.responses.contains_key(&src) {
            return;
        }

        if self.responses.is_empty() {
            ctx.stop_timer(REQUEST_TIMER);
            ctx.start_timer_ms(TIMEOUT_TIMER, self.params.cn_timeout_ms);
        }
        self.responses.insert(src, msg.value);
        let value = msg.value;
        ctx.dbg("info", format_args!("RES {} from {src}: {value}", msg.msg_id));

        if self.responses.len() >= self.params.n_pns {
            self.finish_round(ctx);
        }
    }
}
