//! LLDP show commands

use std::sync::LazyLock;

use crate::command::CommandParser;
use crate::engine::rule::{append, assign, descend, set, text};
use crate::engine::{Coerce, Rule, RuleSet, Target};
use crate::schema::{boolean, integer, list_of, one_of, record, string, table};

// ── show lldp ─────────────────────────────────────────────

pub static LLDP: LazyLock<CommandParser> = LazyLock::new(|| {
    CommandParser::new(
        "show lldp",
        RuleSet::new(vec![
            Rule::new("status", r"^Status:\s*(?P<status>\w+)$")
                .step(assign("status", Coerce::Lower))
                .step(assign("enabled", Coerce::Flag(&["active"])).group("status")),
            Rule::new("disabled", r"^% LLDP is not enabled$")
                .step(set("enabled", false))
                .step(set("status", "inactive")),
            Rule::new(
                "hello_timer",
                r"^LLDP advertisements are sent every (?P<hello_timer>\d+) seconds$",
            )
            .step(assign("hello_timer", Coerce::Int)),
            Rule::new(
                "hold_timer",
                r"^LLDP hold time advertised is (?P<hold_timer>\d+) seconds$",
            )
            .step(assign("hold_timer", Coerce::Int)),
            Rule::new(
                "reinit_timer",
                r"^LLDP interface reinitiali[sz]ation delay is (?P<reinit_timer>\d+) seconds$",
            )
            .step(assign("reinit_timer", Coerce::Int)),
        ]),
        record()
            .required("enabled", boolean())
            .optional("status", one_of(&["active", "inactive"]))
            .optional("hello_timer", integer())
            .optional("hold_timer", integer())
            .optional("reinit_timer", integer()),
    )
});

// ── show lldp traffic ─────────────────────────────────────

pub static LLDP_TRAFFIC: LazyLock<CommandParser> = LazyLock::new(|| {
    CommandParser::new(
        "show lldp traffic",
        RuleSet::new(vec![
            Rule::new("frame_out", r"^Total frames out:\s*(?P<frame_out>\d+)$")
                .step(assign("frame_out", Coerce::Int)),
            Rule::new("entries_aged_out", r"^Total entries aged:\s*(?P<entries_aged_out>\d+)$")
                .step(assign("entries_aged_out", Coerce::Int)),
            Rule::new("frame_in", r"^Total frames in:\s*(?P<frame_in>\d+)$")
                .step(assign("frame_in", Coerce::Int)),
            Rule::new(
                "frame_error_in",
                r"^Total frames received in error:\s*(?P<frame_error_in>\d+)$",
            )
            .step(assign("frame_error_in", Coerce::Int)),
            Rule::new("frame_discard", r"^Total frames discarded:\s*(?P<frame_discard>\d+)$")
                .step(assign("frame_discard", Coerce::Int)),
            Rule::new("tlv_discard", r"^Total TLVs discarded:\s*(?P<tlv_discard>\d+)$")
                .step(assign("tlv_discard", Coerce::Int)),
            Rule::new("tlv_unknown", r"^Total TLVs unrecognized:\s*(?P<tlv_unknown>\d+)$")
                .step(assign("tlv_unknown", Coerce::Int)),
        ]),
        record()
            .required("frame_in", integer())
            .required("frame_out", integer())
            .required("frame_error_in", integer())
            .required("frame_discard", integer())
            .required("tlv_discard", integer())
            .required("tlv_unknown", integer())
            .required("entries_aged_out", integer()),
    )
});

// ── show lldp neighbors detail ────────────────────────────

pub static LLDP_NEIGHBORS_DETAIL: LazyLock<CommandParser> = LazyLock::new(|| {
    CommandParser::new(
        "show lldp neighbors detail",
        RuleSet::new(vec![
            Rule::new("local_intf", r"^Local Intf:\s*(?P<local_intf>\S+)$")
                .step(descend(&["interfaces"], "local_intf")),
            Rule::new("chassis_id", r"^Chassis id:\s*(?P<chassis_id>.+)$")
                .step(assign("chassis_id", Coerce::Str)),
            Rule::new("port_id", r"^Port id:\s*(?P<port_id>.+)$")
                .step(assign("port_id", Coerce::Str)),
            Rule::new(
                "port_description",
                r"^Port Description:\s*(?:- not advertised|(?P<port_description>.+))$",
            )
            .step(assign("port_description", Coerce::Str)),
            Rule::new(
                "system_name",
                r"^System Name:\s*(?:- not advertised|(?P<system_name>.+))$",
            )
            .step(assign("system_name", Coerce::Str)),
            Rule::new("system_description", r"^System Description:\s*(?P<text>.*)$")
                .step(text("system_description").group("text")),
            Rule::new("time_remaining", r"^Time remaining:\s*(?P<time_remaining>\d+) seconds$")
                .step(assign("time_remaining", Coerce::Int)),
            Rule::new(
                "system_capabilities",
                r"^System Capabilities:\s*(?P<system_capabilities>.+)$",
            )
            .step(assign("system_capabilities", Coerce::Split(','))),
            Rule::new(
                "enabled_capabilities",
                r"^Enabled Capabilities:\s*(?P<enabled_capabilities>.+)$",
            )
            .step(assign("enabled_capabilities", Coerce::Split(','))),
            Rule::new("management_address", r"^IP(?:V6)?:\s*(?P<address>\S+)$")
                .step(append("management_addresses", Coerce::Str).group("address")),
            Rule::new(
                "auto_negotiation",
                r"^Auto Negotiation - (?:(?P<supported>supported)|not supported),\s*(?:(?P<enabled>enabled)|disabled)$",
            )
            .step(assign("auto_negotiation_supported", Coerce::Present).group("supported"))
            .step(assign("auto_negotiation_enabled", Coerce::Present).group("enabled")),
            Rule::new("media", r"^(?P<media>\d+base-?\w+\((?:FD|HD)\))$")
                .step(append("physical_media_capabilities", Coerce::Str).group("media")),
            Rule::new("unit_type", r"^Media Attachment Unit type:\s*(?P<unit_type>\d+)$")
                .step(assign("unit_type", Coerce::Int)),
            Rule::new("vlan_id", r"^Vlan ID:\s*(?:- not advertised|(?P<vlan_id>\d+))$")
                .step(assign("vlan_id", Coerce::Int)),
            Rule::new("total_entries", r"^Total entries displayed:\s*(?P<total_entries>\d+)$")
                .step(assign("total_entries", Coerce::Int).at(Target::Root)),
        ]),
        record()
            .required(
                "interfaces",
                table(
                    record()
                        .required("chassis_id", string())
                        .required("port_id", string())
                        .optional("port_description", string())
                        .optional("system_name", string())
                        .optional("system_description", string())
                        .optional("time_remaining", integer())
                        .optional("system_capabilities", list_of(string()))
                        .optional("enabled_capabilities", list_of(string()))
                        .optional("management_addresses", list_of(string()))
                        .optional("auto_negotiation_supported", boolean())
                        .optional("auto_negotiation_enabled", boolean())
                        .optional("physical_media_capabilities", list_of(string()))
                        .optional("unit_type", integer())
                        .optional("vlan_id", integer()),
                ),
            )
            .required("total_entries", integer()),
    )
});
