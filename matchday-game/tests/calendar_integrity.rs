use matchday_game::{
    CalendarError, CalendarService, ClubDirectory, LeagueTier, full_schedule_rounds,
    generate_double_round_robin,
};
use std::collections::{HashMap, HashSet};

fn clubs(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Club {i:02}")).collect()
}

#[test]
fn every_pair_meets_home_and_away_for_any_size() {
    for n in 2..=12 {
        let names = clubs(n);
        let fixtures = generate_double_round_robin(&names, None).unwrap();
        let rounds = full_schedule_rounds(n);
        assert_eq!(fixtures.len(), n * (n - 1), "{n} clubs");

        let mut meetings: HashMap<(&str, &str), u32> = HashMap::new();
        for fixture in &fixtures {
            assert_ne!(fixture.home, fixture.away);
            assert!((1..=rounds).contains(&fixture.round));
            *meetings
                .entry((fixture.home.as_str(), fixture.away.as_str()))
                .or_default() += 1;
        }
        for home in &names {
            for away in names.iter().filter(|away| *away != home) {
                assert_eq!(
                    meetings.get(&(home.as_str(), away.as_str())),
                    Some(&1),
                    "{home} hosting {away} with {n} clubs"
                );
            }
        }

        for round in 1..=rounds {
            let mut seen = HashSet::new();
            for fixture in fixtures.iter().filter(|fixture| fixture.round == round) {
                assert!(seen.insert(fixture.home.as_str()), "round {round}");
                assert!(seen.insert(fixture.away.as_str()), "round {round}");
            }
        }
    }
}

#[test]
fn bundled_leagues_schedule_five_matches_a_round() {
    let service = CalendarService::build(&ClubDirectory::default(), Some(18)).unwrap();
    for tier in LeagueTier::ALL {
        let league = service.league(tier).unwrap();
        assert_eq!(league.fixtures.len(), 90);
        for round in 1..=18 {
            assert_eq!(league.round(round).count(), 5, "{tier} round {round}");
        }
        for club in &league.clubs {
            let personal = league.personal(club);
            assert_eq!(personal.len(), 18);
            let homes = personal.entries().iter().filter(|e| e.is_home).count();
            assert_eq!(homes, 9, "{club}");
        }
    }
}

#[test]
fn degenerate_club_sets_are_rejected() {
    assert_eq!(
        generate_double_round_robin(&[], None),
        Err(CalendarError::EmptyClubSet)
    );
    assert_eq!(
        generate_double_round_robin(&clubs(1), None),
        Err(CalendarError::TooFewClubs(1))
    );
    assert!(matches!(
        generate_double_round_robin(&clubs(4), Some(7)),
        Err(CalendarError::RoundsExceedSchedule { requested: 7, .. })
    ));
}
