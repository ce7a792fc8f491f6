use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serterm_transport::PortSummary;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    vid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<&'a str>,
}

#[derive(Serialize)]
struct PortsOutput<'a> {
    ports: Vec<PortOutput<'a>>,
}

pub fn print_ports(ports: &[PortSummary], format: OutputFormat) {
    println!("{}", render_ports(ports, format));
}

pub fn render_ports(ports: &[PortSummary], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let out = PortsOutput {
                ports: ports.iter().map(port_output).collect(),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "KIND", "USB ID", "PRODUCT"]);
            for port in ports {
                table.add_row(vec![
                    port.name.clone(),
                    port.kind.as_str().to_string(),
                    usb_id(port).unwrap_or_default(),
                    port.product.clone().unwrap_or_default(),
                ]);
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            if ports.is_empty() {
                return "no serial ports found".to_string();
            }
            ports
                .iter()
                .map(|port| {
                    let mut line = format!("{} ({})", port.name, port.kind.as_str());
                    if let Some(id) = usb_id(port) {
                        line.push_str(&format!(" usb={id}"));
                    }
                    if let Some(product) = &port.product {
                        line.push_str(&format!(" product={product}"));
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

fn port_output(port: &PortSummary) -> PortOutput<'_> {
    PortOutput {
        name: &port.name,
        kind: port.kind.as_str(),
        vid: port.usb_id.map(|(vid, _)| format!("{vid:04x}")),
        pid: port.usb_id.map(|(_, pid)| format!("{pid:04x}")),
        product: port.product.as_deref(),
    }
}

fn usb_id(port: &PortSummary) -> Option<String> {
    port.usb_id.map(|(vid, pid)| format!("{vid:04x}:{pid:04x}"))
}
