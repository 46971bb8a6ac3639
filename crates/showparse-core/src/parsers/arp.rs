//! `show arp`

use std::sync::LazyLock;

use crate::command::CommandParser;
use crate::engine::rule::{assign, descend, set};
use crate::engine::{Coerce, Rule, RuleSet};
use crate::schema::{integer, one_of, record, string, table};

pub static ARP: LazyLock<CommandParser> = LazyLock::new(|| {
    CommandParser::new(
        "show arp",
        RuleSet::new(vec![
            Rule::new(
                "static_entry",
                r"^Internet\s+(?P<address>\S+)\s+-\s+(?P<mac>\S+)\s+(?P<type>\S+)(?:\s+(?P<interface>\S+))?$",
            )
            .step(descend(&["entries"], "address"))
            .step(assign("mac", Coerce::Mac))
            .step(assign("type", Coerce::Str))
            .step(assign("interface", Coerce::Str))
            .step(set("origin", "static")),
            Rule::new(
                "dynamic_entry",
                r"^Internet\s+(?P<address>\S+)\s+(?P<age>\d+)\s+(?P<mac>\S+)\s+(?P<type>\S+)(?:\s+(?P<interface>\S+))?$",
            )
            .step(descend(&["entries"], "address"))
            .step(assign("age", Coerce::Int))
            .step(assign("mac", Coerce::Mac))
            .step(assign("type", Coerce::Str))
            .step(assign("interface", Coerce::Str))
            .step(set("origin", "dynamic")),
        ]),
        record().required(
            "entries",
            table(
                record()
                    .optional("age", integer())
                    .optional("mac", string())
                    .required("type", string())
                    .optional("interface", string())
                    .required("origin", one_of(&["static", "dynamic"])),
            ),
        ),
    )
});
