use crate::models::ChartDataItem;

/// Placeholder data for the frontend charts
pub struct ChartDataService;

impl ChartDataService {
    pub fn dummy_chart_data() -> Vec<ChartDataItem> {
        [
            ("January", 65),
            ("February", 59),
            ("March", 80),
            ("April", 81),
            ("May", 56),
            ("June", 55),
            ("July", 40),
        ]
        .iter()
        .map(|(label, value)| ChartDataItem::new(label, *value))
        .collect()
    }

    pub fn nutrition_chart_data() -> Vec<ChartDataItem> {
        vec![
            ChartDataItem::new("Protein", 25),
            ChartDataItem::new("Carbs", 45),
            ChartDataItem::new("Fat", 30),
        ]
    }
}
