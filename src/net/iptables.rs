/// Builder for iptables invocations, rendered to a shell string so it
/// can also run inside the VM through `limactl shell`.
#[derive(Debug, Clone, Default)]
pub struct IpTables {
    sudo: bool,
    table: Option<String>,
}

impl IpTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sudo(mut self) -> Self {
        self.sudo = true;
        self
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Render with `-C`: exit status reports whether the rule exists.
    pub fn check(&self, spec: &str) -> String {
        self.render("-C", spec)
    }

    /// Render with `-A`: append the rule.
    pub fn append(&self, spec: &str) -> String {
        self.render("-A", spec)
    }

    /// Render with `-D`: delete the rule.
    pub fn delete(&self, spec: &str) -> String {
        self.render("-D", spec)
    }

    fn render(&self, command: &str, spec: &str) -> String {
        let mut out = String::new();
        if self.sudo {
            out.push_str("sudo ");
        }
        out.push_str("iptables ");
        if let Some(table) = &self.table {
            out.push_str("-t ");
            out.push_str(table);
            out.push(' ');
        }
        out.push_str(command);
        out.push(' ');
        out.push_str(spec);
        out
    }
}
