use citycast_core::ForecastViewModel;
use std::fmt;

/// Plain-text card for one city.
pub struct Card<'a>(pub &'a ForecastViewModel);

impl fmt::Display for Card<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vm = self.0;

        writeln!(f, "{}  {}°C  {}", vm.city, vm.temperature, vm.weather_text)?;
        writeln!(
            f,
            "  wind {} km/h | humidity {}% | visibility {} km",
            vm.wind_speed, vm.humidity, vm.visibility
        )?;
        if !vm.summary.is_empty() {
            writeln!(f, "  {}", vm.summary)?;
        }
        for day in &vm.forecasts {
            writeln!(f, "    {:<7} {:>5}°C  {}", day.date, day.temp, day.icon)?;
        }

        Ok(())
    }
}

pub fn card(vm: &ForecastViewModel) -> String {
    Card(vm).to_string()
}
