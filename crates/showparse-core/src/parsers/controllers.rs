//! Optical controller show commands
//!
//! Both commands print one block per port, split into titled sections.
//! Section headers switch the cursor into a child mapping below the port;
//! fields that belong to the port itself are written through a slot so
//! their placement does not depend on which section came last.

use std::sync::LazyLock;

use crate::command::{CommandParser, KEY_SLOT};
use crate::engine::rule::{append, assign, descend, pairs, section};
use crate::engine::{Coerce, Rule, RuleSet, Target};
use crate::schema::{boolean, float, integer, list_of, record, string, table};

/// Alarm counter grids: `LOS = 0 LOF = 0 LOM = 0`
const ALARM_GRID: &str = r"^[A-Z][A-Z_-]*\s*=\s*\d+(?:\s+[A-Z][A-Z_-]*\s*=\s*\d+)*$";

const ENABLED: &[&str] = &["enable", "enabled"];

// ── show controllers coherentDSP ──────────────────────────

pub static COHERENT_DSP: LazyLock<CommandParser> = LazyLock::new(|| {
    let port = Target::Slot("port");
    CommandParser::new(
        "show controllers coherentDSP {port}",
        RuleSet::new(vec![
            Rule::new("port", r"^Port\s*:\s*CoherentDSP\s+(?P<port>\S+)$")
                .step(descend(&["ports"], "port").slot("port")),
            Rule::new("controller_state", r"^Controller State\s*:\s*(?P<controller_state>.+)$")
                .step(assign("controller_state", Coerce::Lower).at(port)),
            Rule::new(
                "inherited_secondary_state",
                r"^Inherited Secondary State\s*:\s*(?P<inherited_secondary_state>.+)$",
            )
            .step(assign("inherited_secondary_state", Coerce::Lower).at(port)),
            Rule::new(
                "configured_secondary_state",
                r"^Configured Secondary State\s*:\s*(?P<configured_secondary_state>.+)$",
            )
            .step(assign("configured_secondary_state", Coerce::Lower).at(port)),
            Rule::new("derived_state", r"^Derived State\s*:\s*(?P<derived_state>.+)$")
                .step(assign("derived_state", Coerce::Lower).at(port)),
            Rule::new("loopback_mode", r"^Loopback mode\s*:\s*(?P<loopback_mode>.+)$")
                .step(assign("loopback_mode", Coerce::Str).at(port)),
            Rule::new(
                "ber_thresholds",
                r"^BER Thresholds\s*:\s*SF\s*=\s*(?P<sf>\S+)\s+SD\s*=\s*(?P<sd>\S+)$",
            )
            .step(assign("ber_threshold_sf", Coerce::Float).group("sf").at(port))
            .step(assign("ber_threshold_sd", Coerce::Float).group("sd").at(port)),
            Rule::new("performance_monitoring", r"^Performance Monitoring\s*:\s*(?P<pm>\S+)$")
                .step(
                    assign("performance_monitoring", Coerce::Flag(ENABLED))
                        .group("pm")
                        .at(port),
                ),
            Rule::new("bandwidth", r"^Bandwidth\s*:\s*(?P<bandwidth>[\d.]+)\s*Gb/s$")
                .step(assign("bandwidth_gbps", Coerce::Float).group("bandwidth").at(port)),
            Rule::new("alarm_information", r"^Alarm Information:$")
                .step(section(port, "alarm_information")),
            Rule::new("detected_alarms", r"^Detected Alarms\s*:\s*(?P<alarm>.+)$")
                .step(append("detected_alarms", Coerce::Str).group("alarm").at(port)),
            Rule::new("ber_information", r"^Bit Error Rate Information$")
                .step(section(port, "ber_information")),
            Rule::new("prefec_ber", r"^PREFEC\s+BER\s*:\s*(?P<prefec_ber>\S+)$")
                .step(assign("prefec_ber", Coerce::Float)),
            Rule::new("postfec_ber", r"^POSTFEC\s+BER\s*:\s*(?P<postfec_ber>\S+)$")
                .step(assign("postfec_ber", Coerce::Float)),
            Rule::new("q_factor", r"^Q-Factor\s*:\s*(?P<q_factor>\S+?)\s*dB$")
                .step(assign("q_factor", Coerce::Float)),
            Rule::new("q_margin", r"^Q-Margin\s*:\s*(?P<q_margin>\S+?)\s*dB$")
                .step(assign("q_margin", Coerce::Float)),
            Rule::new("fec_mode", r"^FEC mode\s*:\s*(?P<fec_mode>.+)$")
                .step(assign("fec_mode", Coerce::Str).at(port)),
            Rule::new("alarm_counters", ALARM_GRID).step(pairs(Coerce::Int)),
        ]),
        record().required(
            "ports",
            table(
                record()
                    .required("controller_state", string())
                    .optional("inherited_secondary_state", string())
                    .optional("configured_secondary_state", string())
                    .optional("derived_state", string())
                    .optional("loopback_mode", string())
                    .optional("ber_threshold_sf", float())
                    .optional("ber_threshold_sd", float())
                    .optional("performance_monitoring", boolean())
                    .optional("bandwidth_gbps", float())
                    .optional("alarm_information", table(integer()))
                    .optional("detected_alarms", list_of(string()))
                    .optional(
                        "ber_information",
                        record()
                            .optional("prefec_ber", float())
                            .optional("postfec_ber", float())
                            .optional("q_factor", float())
                            .optional("q_margin", float()),
                    )
                    .optional("fec_mode", string()),
            ),
        ),
    )
});

// ── show controllers optics ───────────────────────────────

pub static OPTICS: LazyLock<CommandParser> = LazyLock::new(|| {
    let port = Target::Slot(KEY_SLOT);
    let status = Target::Slot("status");
    CommandParser::new(
        "show controllers optics {port}",
        RuleSet::new(vec![
            Rule::new("controller_state", r"^Controller State:\s*(?P<controller_state>.+)$")
                .step(assign("controller_state", Coerce::Lower).at(port)),
            Rule::new(
                "transport_admin_state",
                r"^Transport Admin State:\s*(?P<transport_admin_state>.+)$",
            )
            .step(assign("transport_admin_state", Coerce::Lower).at(port)),
            Rule::new("laser_state", r"^Laser State:\s*(?P<laser_state>.+)$")
                .step(assign("laser_state", Coerce::Lower).at(port)),
            Rule::new("led_state", r"^LED State:\s*(?P<led_state>.+)$")
                .step(assign("led_state", Coerce::Lower).at(port)),
            Rule::new("fec_state", r"^FEC State:\s*(?P<fec_state>.+)$")
                .step(assign("fec_state", Coerce::Lower).at(port)),
            Rule::new("optics_status", r"^Optics Status$")
                .step(section(port, "optics_status").slot("status")),
            Rule::new("optics_type", r"^Optics Type:\s*(?P<optics_type>.+)$")
                .step(assign("optics_type", Coerce::Str).at(status)),
            Rule::new("wavelength", r"^Wavelength\s*=\s*(?P<wavelength>\S+)\s*nm$")
                .step(assign("wavelength_nm", Coerce::Float).group("wavelength").at(status)),
            Rule::new("detected_alarms", r"^Detected Alarms:\s*(?P<alarm>.+)$")
                .step(append("detected_alarms", Coerce::Str).group("alarm").at(status)),
            Rule::new("alarm_statistics", r"^Alarm Statistics:$")
                .step(section(status, "alarm_statistics")),
            Rule::new(
                "laser_bias_current",
                r"^Laser Bias Current\s*=\s*(?P<current>\S+?)(?:\s*mA)?$",
            )
            .step(assign("laser_bias_current_ma", Coerce::Float).group("current").at(status)),
            Rule::new("tx_power", r"^Actual TX Power\s*=\s*(?P<power>\S+?)(?:\s*dBm)?$")
                .step(assign("tx_power_dbm", Coerce::Float).group("power").at(status)),
            Rule::new("rx_power", r"^RX Power\s*=\s*(?P<power>\S+?)(?:\s*dBm)?$")
                .step(assign("rx_power_dbm", Coerce::Float).group("power").at(status)),
            Rule::new("performance_monitoring", r"^Performance Monitoring:\s*(?P<pm>\S+)$")
                .step(
                    assign("performance_monitoring", Coerce::Flag(ENABLED))
                        .group("pm")
                        .at(status),
                ),
            Rule::new("vendor_details", r"^Transceiver Vendor Details$")
                .step(section(port, "transceiver")),
            Rule::new("form_factor", r"^Form Factor\s*:\s*(?P<form_factor>.+)$")
                .step(assign("form_factor", Coerce::Str)),
            Rule::new("vendor_name", r"^Name\s*:\s*(?P<name>.+)$")
                .step(assign("name", Coerce::Str)),
            Rule::new("part_number", r"^Part Number\s*:\s*(?P<part_number>.+)$")
                .step(assign("part_number", Coerce::Str)),
            Rule::new("rev_number", r"^Rev Number\s*:\s*(?P<rev_number>.+)$")
                .step(assign("rev_number", Coerce::Str)),
            Rule::new("serial_number", r"^Serial Number\s*:\s*(?P<serial_number>.+)$")
                .step(assign("serial_number", Coerce::Str)),
            Rule::new("pid", r"^PID\s*:\s*(?P<pid>.+)$").step(assign("pid", Coerce::Str)),
            Rule::new("vid", r"^VID\s*:\s*(?P<vid>.+)$").step(assign("vid", Coerce::Str)),
            Rule::new("date_code", r"^Date Code\(yy/mm/dd\)\s*:\s*(?P<date_code>\S+)$")
                .step(assign("date_code", Coerce::Str)),
            Rule::new("identifier", r"^Identifier\s*:\s*(?P<identifier>\S+)$")
                .step(assign("identifier", Coerce::Int)),
            Rule::new("alarm_counters", ALARM_GRID).step(pairs(Coerce::Int)),
        ]),
        table(
            record()
                .required("controller_state", string())
                .optional("transport_admin_state", string())
                .optional("laser_state", string())
                .optional("led_state", string())
                .optional("fec_state", string())
                .optional(
                    "optics_status",
                    record()
                        .optional("optics_type", string())
                        .optional("wavelength_nm", float())
                        .optional("detected_alarms", list_of(string()))
                        .optional("alarm_statistics", table(integer()))
                        .optional("laser_bias_current_ma", float())
                        .optional("tx_power_dbm", float())
                        .optional("rx_power_dbm", float())
                        .optional("performance_monitoring", boolean()),
                )
                .optional(
                    "transceiver",
                    record()
                        .optional("form_factor", string())
                        .optional("name", string())
                        .optional("part_number", string())
                        .optional("rev_number", string())
                        .optional("serial_number", string())
                        .optional("pid", string())
                        .optional("vid", string())
                        .optional("date_code", string())
                        .optional("identifier", integer()),
                ),
        ),
    )
    .keyed_by("port")
});
