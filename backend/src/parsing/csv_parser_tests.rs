#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::models::{AttendanceStatus, ProductBand, SchoolId};
    use crate::parsing::rows::*;
    use crate::parsing::*;

    #[test]
    fn test_quote_handling() {
        assert_eq!(parse_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
        assert_eq!(parse_line("a,\"b\"\"c\",d"), vec!["a", "b\"c", "d"]);
    }

    #[test]
    fn test_load_records_zips_against_header() {
        let set = load_records("id,nome\n1, Alpha \n2,\"Beta, Gama\"\n");
        assert_eq!(set.headers, vec!["id", "nome"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.records[0].get("nome"), "Alpha");
        assert_eq!(set.records[1].get("nome"), "Beta, Gama");
        assert_eq!(set.records[1].get("missing"), "");
        assert!(set.dropped_lines.is_empty());
    }

    #[test]
    fn test_load_records_drops_mismatched_rows() {
        let text = "a,b,c\n1,2,3\n1,2\n\n4,5,6,7\n7,8,9\n";
        let set = load_records(text);
        assert_eq!(set.len(), 2);
        // Blank line 4 is skipped, not reported
        assert_eq!(set.dropped_lines, vec![3, 5]);
    }

    #[test]
    fn test_strict_loader_reports_first_bad_line() {
        let err = load_records_strict("a,b\n1,2\n3\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::RowShape {
                line: 3,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(load_records_strict("\n  \n"), Err(ParseError::MissingHeader));
        assert!(load_records_strict("a,b\n1,2\n").is_ok());
    }

    #[test]
    fn test_bom_and_crlf_are_accepted() {
        let set = load_records("\u{feff}id,nome\r\n1,Alpha\r\n\r\n");
        assert_eq!(set.headers, vec!["id", "nome"]);
        assert_eq!(set.records[0].get("nome"), "Alpha");
    }

    #[test]
    fn test_empty_text_is_empty_set() {
        assert!(load_records("").is_empty());
        assert!(load_records("id,nome\n").is_empty());
    }

    #[test]
    fn test_lenient_numeric_coercion() {
        use crate::parsing::records::{parse_count, parse_flag, parse_number};
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count(" 7abc"), 7);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("x"), 0);
        assert_eq!(parse_number("3,5"), Some(3.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("Sim"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_date_strict() {
        assert!(parse_date_strict("2025-03-10").is_ok());
        assert!(matches!(
            parse_date_strict("10/13/2025"),
            Err(ParseError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_schools_from_records() {
        let set = load_records(
            "id,nome,municipio,regional,ensino_fundamental,ensino_medio,total_alunos,nome_tcgp,email_tcgp,alunos_1ano\n\
             1,EEEFM  Alpha,Serra,Carapina,true,false,320,Maria Souza,MARIA@EDU.ES.GOV.BR,40\n\
             x,Sem Id,Serra,Carapina,true,false,10,,,0\n",
        );
        let schools = schools_from_records(&set);
        assert_eq!(schools.len(), 1);
        let school = &schools[0];
        assert_eq!(school.id, SchoolId(1));
        assert_eq!(school.name, "EEEFM Alpha");
        assert_eq!(school.keys.name, "eeefm alpha");
        assert!(school.levels.ensino_fundamental);
        assert!(!school.levels.ensino_medio);
        assert_eq!(school.counts.total_alunos, 320);
        let coordinator = school.coordinator.as_ref().unwrap();
        assert_eq!(coordinator.email, "maria@edu.es.gov.br");
        assert_eq!(school.grades.get("alunos_1ano"), Some(&40));
    }

    #[test]
    fn test_classes_taught_subjects_come_from_headers() {
        let set = load_records(
            "escola_id,turma,data,dia_letivo,aulas_previstas_LP,aulas_dadas_LP,aulas_previstas_MAT,aulas_dadas_MAT\n\
             1,1A,03/03/2025,1,2,2,3,\n",
        );
        assert_eq!(subjects_in(&set), vec!["LP", "MAT"]);
        let rows = classes_taught_from_records(&set);
        assert_eq!(rows[0].escola_id, Some(SchoolId(1)));
        assert_eq!(rows[0].subjects[0].previstas, 2);
        assert_eq!(rows[0].subjects[1].previstas, 3);
        assert_eq!(rows[0].subjects[1].dadas, 0);
        assert!(rows[0].data.is_some());
    }

    #[test]
    fn test_attendance_uses_accented_headers() {
        let set = load_records(
            "Regional,Município,Escola,Série,Turma,Aluno,Dias do mês,Presença/Falta,Data,Dia Letivo\n\
             Carapina,Serra,EEEFM Alpha,1º ano,1A,Ana Lima,03,P,03/03/2025,1\n\
             Carapina,Serra,EEEFM Alpha,1º ano,1A,Ana Lima,04,F,04/03/2025,2\n",
        );
        let rows = attendance_from_records(&set);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].municipio, "Serra");
        assert_eq!(rows[0].status, AttendanceStatus::Present);
        assert_eq!(rows[1].status, AttendanceStatus::Absent);
        assert_eq!(rows[1].dia_letivo, 2);
    }

    #[test]
    fn test_management_cycle_rows() {
        let set = load_records(
            "escola_id,produto_status,tarefas_total,tarefas_concluidas,tarefas_concluidas_atraso,visitas_tecnicas_esperadas\n\
             1,26–50,20,8,2,6\n",
        );
        let rows = management_cycle_from_records(&set);
        assert_eq!(rows[0].tasks.total, 20);
        assert_eq!(rows[0].tasks.concluidas, 8);
        assert_eq!(rows[0].tasks.concluidas_atraso, 2);
        assert_eq!(rows[0].visits.esperadas, 6);
        assert_eq!(rows[0].product_band(), Some(ProductBand::From26To50));
    }

    #[test]
    fn test_technical_visit_rows() {
        let set = load_records(
            "escola_id,ciclo,etapa,numero_visita,tematica,realizada,ata_assinada,data_visita,data_ata\n\
             1,2,Diagnóstico,1,Leitura,true,false,2025-05-02,\n",
        );
        let rows = technical_visits_from_records(&set);
        assert_eq!(rows[0].ciclo, 2);
        assert!(rows[0].realizada);
        assert!(!rows[0].ata_assinada);
        assert!(rows[0].data_visita.is_some());
        assert!(rows[0].data_ata.is_none());
    }

    #[test]
    fn test_indicator_rows_keep_sentinels() {
        let set = load_records(
            "escola_id,escola_nome,regional,municipio,indicador_aulas_dadas,indicador_frequencia,indicador_tarefas,indicador_produtos,indicador_visitas_tecnicas\n\
             1,EEEFM Alpha,Carapina,Serra,90,80,50,38,60\n\
             ,Espírito Santo,,,85.5,79,45,40,55\n",
        );
        let rows = indicators_from_records(&set);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].escola_id, Some(SchoolId(1)));
        assert_eq!(rows[1].escola_id, None);
        assert_eq!(rows[1].values.aulas_dadas, 85.5);
    }

    proptest! {
        #[test]
        fn prop_plain_values_round_trip(values in proptest::collection::vec("[A-Za-z0-9_]{0,8}", 1..8)) {
            let line = values.join(",");
            prop_assert_eq!(parse_line(&line), values);
        }

        #[test]
        fn prop_format_then_parse_round_trips(values in proptest::collection::vec("[A-Za-z0-9_ ,\"]{0,8}", 1..6)) {
            let line = format_line(&values);
            // Unquoted fields are trimmed, so compare against trimmed plain values
            let expected: Vec<String> = values
                .iter()
                .map(|v| {
                    let quoted = v.contains(',') || v.contains('"') || v.starts_with(' ') || v.ends_with(' ');
                    if quoted { v.clone() } else { v.trim().to_string() }
                })
                .collect();
            prop_assert_eq!(parse_line(&line), expected);
        }
    }
}
