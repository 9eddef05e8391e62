pub mod bubble_chart;
pub mod postings_chart;
