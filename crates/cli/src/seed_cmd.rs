use std::io::IsTerminal;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use dialoguer::Confirm;
use schoolbase_store::cleanup::cleanup_demo_data;
use schoolbase_store::seed::{
    DemoSchoolSeeder, SeedReport, Seeder, SubscriptionPlansSeeder, SuperAdminSeeder, run_seeders,
};

use crate::runtime::Runtime;

pub fn run_seed(rt: &Runtime, demo: bool) -> Result<()> {
    let db = rt.open_migrated()?;
    let settings = &rt.config.seed;

    let password = settings.admin_password().with_context(|| {
        format!("Super-admin password for {} is not available", settings.admin_email)
    })?;
    let plans = SubscriptionPlansSeeder::default();
    let admin = SuperAdminSeeder {
        email: settings.admin_email.clone(),
        first_name: settings.admin_first_name.clone(),
        last_name: settings.admin_last_name.clone(),
        password,
    };
    let demo_school = if demo {
        let password = rt
            .config
            .demo
            .password()
            .context("Demo account password is not available")?;
        Some(DemoSchoolSeeder {
            domain: rt.config.demo.email_domain.clone(),
            password,
            today: Utc::now().date_naive(),
        })
    } else {
        None
    };

    let mut seeders: Vec<&dyn Seeder> = vec![&plans as &dyn Seeder, &admin];
    if let Some(seeder) = &demo_school {
        seeders.push(seeder);
    }

    let reports = run_seeders(&db, &seeders).context("Seeding failed")?;
    for (name, report) in reports {
        print_report(name, report);
    }
    Ok(())
}

fn print_report(name: &str, report: SeedReport) {
    println!(
        "  {name:<20} {} created, {} already present",
        report.created, report.existing
    );
}

pub fn run_cleanup_demo(rt: &Runtime, yes: bool) -> Result<()> {
    let domain = &rt.config.demo.email_domain;
    if !yes {
        if !std::io::stdin().is_terminal() {
            bail!("Refusing to delete demo data without --yes in a non-interactive session");
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete every school and user with an @{domain} address?"
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let db = rt.open_migrated()?;
    let report = cleanup_demo_data(&db, domain).context("Demo cleanup failed")?;
    println!(
        "Removed {} school(s) and {} user(s) under @{domain}",
        report.schools, report.users
    );
    Ok(())
}
