use astroshop_core::{Category, Money, Product};

/// Category entry of the fixed catalog: ordered (name, price) pairs.
pub type CatalogSection = (Category, &'static [(&'static str, f64)]);

pub const ASTRONOMY_CATALOG: &[CatalogSection] = &[
    (
        Category::Telescope,
        &[
            ("Telescópio Reflector 70mm", 199.99),
            ("Telescópio Refrator 120mm", 349.99),
            ("Telescópio Cassegrain 150mm", 899.99),
            ("Telescópio Maksutov 90mm", 499.99),
            ("Telescópio Newtoniano 130mm", 379.99),
            ("Telescópio Refrator 80mm", 250.00),
            ("Telescópio Solar 150mm", 499.00),
            ("Telescópio Catadióptrico 200mm", 700.00),
            ("Telescópio ZWO 80mm", 899.50),
            ("Telescópio SkyWatcher 120mm", 650.00),
        ],
    ),
    (
        Category::Binoculars,
        &[
            ("Binóculo 10x42", 89.99),
            ("Binóculo 12x50", 120.50),
            ("Binóculo 8x32", 65.99),
            ("Binóculo 8x42", 79.99),
            ("Binóculo 10x56", 145.00),
            ("Binóculo 20x80", 250.00),
            ("Binóculo 15x70", 185.50),
            ("Binóculo 10x25", 50.00),
            ("Binóculo 7x35", 80.00),
            ("Binóculo 10x42 Compacto", 99.99),
        ],
    ),
    (
        Category::StarMaps,
        &[
            ("Mapa Celeste de Observação Noturna", 29.99),
            ("Mapa Celeste para Iniciantes", 25.99),
            ("Mapa Celeste de Constelações", 22.50),
            ("Atlas Astronômico", 50.00),
            ("Mapa de Estrelas e Galáxias", 39.99),
            ("Mapa Estelar Interativo", 45.00),
            ("Mapa de Céu Profundo", 60.00),
            ("Mapa do Céu para Astronomia Avançada", 55.00),
            ("Mapa Astronômico do Hemisfério Norte", 30.00),
            ("Mapa do Universo em 3D", 80.00),
        ],
    ),
    (
        Category::AstronomyBooks,
        &[
            ("O Universo e Seus Mistérios", 39.99),
            ("Astronomia para Iniciantes", 19.99),
            ("Guia Completo de Telescópios", 34.99),
            ("Explorando os Céus", 25.50),
            ("O Cosmos em Detalhes", 29.99),
            ("Guia do Céu Profundo", 45.00),
            ("Astronomia: Uma Nova Perspectiva", 40.00),
            ("Como Observar Estrelas e Galáxias", 37.50),
            ("Astronomia para Todos", 20.99),
            ("O Mistério dos Buracos Negros", 49.99),
        ],
    ),
    (
        Category::ObservationKits,
        &[
            ("Kit Completo de Observação Astronômica", 249.99),
            ("Kit de Observação Solar", 99.99),
            ("Kit de Observação Lunar", 129.99),
            ("Kit para Observação de Estrelas", 149.99),
            ("Kit de Iniciação à Astronomia", 89.99),
            ("Kit para Fotografia Astronômica", 179.99),
            ("Kit de Observação de Planetas", 199.99),
            ("Kit Completo de Astrofotografia", 399.99),
            ("Kit de Observação de Meteoros", 59.99),
            ("Kit de Observação com Binóculos", 120.00),
        ],
    ),
];

/// Flatten catalog sections into products with sequential ids.
///
/// Ids are zero-padded to the width of the product count (minimum three
/// digits), so they sort in catalog order.
pub fn build_catalog(sections: &[CatalogSection]) -> Vec<Product> {
    let total: usize = sections.iter().map(|(_, items)| items.len()).sum();
    let width = total.to_string().len().max(3);

    sections
        .iter()
        .flat_map(|(category, items)| items.iter().map(move |item| (*category, item)))
        .enumerate()
        .map(|(idx, (category, (name, price)))| Product {
            id: format!("prod_{:0width$}", idx + 1),
            name: (*name).to_string(),
            category,
            price: Money::from_decimal(*price),
        })
        .collect()
}
