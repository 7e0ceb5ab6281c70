use crate::pipeline::{EventLog, Frame, TransformStage};
use crate::Result;

/// Hook for derived features. Currently returns its input unchanged.
#[derive(Clone, Debug, Default)]
pub struct FeatureEngineeringStage;

impl TransformStage for FeatureEngineeringStage {
    fn name(&self) -> &'static str {
        "features"
    }

    fn process(&self, input: Frame, _events: &mut EventLog) -> Result<Frame> {
        let table = input.into_table(self.name())?;
        Ok(Frame::Table(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Table};

    #[test]
    fn test_identity() {
        let table = Table::new(vec![
            Column::from_f64("years", &[1.0, 2.0]),
            Column::from_f64("salary", &[3.0, 4.0]),
        ])
        .unwrap();
        let mut events = EventLog::new();
        let out = FeatureEngineeringStage
            .process(table.clone().into(), &mut events)
            .unwrap();
        assert_eq!(out, Frame::Table(table));
        assert!(events.records().is_empty());
    }
}
