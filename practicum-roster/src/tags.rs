//! Project tags derived from the project title.

/// Keyword (matched as a lowercase substring) and the tag it yields, in priority order.
const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("machine learning", "Machine Learning"),
    ("deep learning", "Deep Learning"),
    ("neural network", "Neural Networks"),
    ("classification", "Classification"),
    ("regression", "Regression"),
    ("clustering", "Clustering"),
    ("nlp", "Natural Language Processing"),
    ("natural language", "Natural Language Processing"),
    ("computer vision", "Computer Vision"),
    ("image processing", "Image Processing"),
    ("data visualization", "Data Visualization"),
    ("predictive", "Predictive Analytics"),
    ("analysis", "Data Analysis"),
    ("python", "Python"),
    ("r programming", "R"),
    ("sql", "SQL"),
    ("web scraping", "Web Scraping"),
    ("api", "API Integration"),
    ("dashboard", "Dashboard"),
    ("time series", "Time Series Analysis"),
    ("forecasting", "Forecasting"),
    ("recommendation", "Recommendation Systems"),
    ("sentiment", "Sentiment Analysis"),
    ("text mining", "Text Mining"),
    ("big data", "Big Data"),
    ("spark", "Apache Spark"),
    ("hadoop", "Hadoop"),
    ("tensorflow", "TensorFlow"),
    ("pytorch", "PyTorch"),
    ("scikit", "Scikit-learn"),
    ("pandas", "Pandas"),
    ("numpy", "NumPy"),
    ("matplotlib", "Matplotlib"),
    ("seaborn", "Seaborn"),
    ("plotly", "Plotly"),
    ("tableau", "Tableau"),
    ("power bi", "Power BI"),
    ("excel", "Excel"),
    ("statistics", "Statistics"),
    ("statistical", "Statistics"),
];

/// Tags used when no keyword matches.
pub const DEFAULT_TAGS: &[&str] = &["Data Science", "Python", "Analytics"];

pub const MAX_TAGS: usize = 5;

/// Up to [`MAX_TAGS`] distinct tags for `title`.
pub fn extract_tags(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for (keyword, tag) in TAG_KEYWORDS {
        if lower.contains(keyword) && !tags.iter().any(|t| t == tag) {
            tags.push((*tag).to_string());
        }
    }
    if tags.is_empty() {
        return DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
    }
    tags.truncate(MAX_TAGS);
    tags
}
