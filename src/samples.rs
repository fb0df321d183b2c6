//! Built-in sample quarterly reports for trying the pipeline without files.
//!
//! The companies and figures are fictional.

use finrag_core::models::Document;

const BANCO_AURORA_3T25: &str = "\
📄 Relatório Trimestral Banco Aurora 3T25:
Resultados do terceiro trimestre de 2025 (3T25)

Lucro líquido recorrente de R$ 4,2 bilhões no 3T25, alta de 12,4% em relação ao 3T24.
ROE recorrente de 21,8% no trimestre, avanço de 1,1 p.p. na comparação anual.
Margem financeira com clientes de R$ 11,6 bilhões, crescimento de 8,3% no ano.
Receita de prestação de serviços de R$ 5,1 bilhões, alta de 6,0% no trimestre.
Carteira de crédito total de R$ 612 bilhões, expansão de 9,7% em doze meses.
Índice de inadimplência acima de 90 dias estável em 2,6%.
Patrimônio líquido de R$ 78,4 bilhões ao final de setembro de 2025.
Índice de eficiência de 39,2%, melhor patamar da série histórica.";

const VAREJO_HORIZONTE_3T25: &str = "\
📄 Relatório Trimestral Varejo Horizonte 3T25:
Desempenho do terceiro trimestre de 2025

Receita líquida consolidada de R$ 9,8 bilhões no 3T25, alta de 7,1% sobre o 3T24.
Vendas mesmas lojas cresceram 5,4% no trimestre, com destaque para o canal digital.
EBITDA ajustado de R$ 1,02 bilhão, com margem EBITDA de 10,4%.
Lucro líquido de R$ 312 milhões, revertendo prejuízo registrado em 2024.
GMV digital de R$ 3,4 bilhões, representando 35% das vendas totais.
Dívida líquida de R$ 2,1 bilhões, equivalente a 0,6x o EBITDA dos últimos doze meses.
Abertura de 18 novas lojas no período, totalizando 1.146 unidades.";

const ENERGIA_VALE_VERDE_3T25: &str = "\
📄 Relatório Trimestral Energia Vale Verde 3T25:
Principais indicadores do trimestre

Geração de energia de 4.850 GWh no 3T25, 14% acima do mesmo período de 2024.
Receita operacional líquida de R$ 2,7 bilhões, crescimento de 9,5% no trimestre.
EBITDA de R$ 1,6 bilhão com margem de 59,3%.
Lucro líquido de R$ 640 milhões, alta de 18,2% na comparação anual.
Investimentos de R$ 1,3 bilhão em novos parques eólicos e solares.
Alavancagem de 2,4x dívida líquida sobre EBITDA.
Declaração de dividendos intermediários de R$ 420 milhões.";

/// The sample reports, each with a `📄` title line.
pub fn sample_reports() -> Vec<Document> {
    vec![
        Document::new("sample:banco-aurora-3t25", BANCO_AURORA_3T25),
        Document::new("sample:varejo-horizonte-3t25", VAREJO_HORIZONTE_3T25),
        Document::new("sample:energia-vale-verde-3t25", ENERGIA_VALE_VERDE_3T25),
    ]
}
