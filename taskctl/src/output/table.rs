use tabled::{Table, settings::Style};

pub(crate) trait TaskctlTable {
    fn styled(&mut self) -> &mut Self;
}

impl TaskctlTable for Table {
    fn styled(&mut self) -> &mut Self {
        self.with(Style::psql())
    }
}
