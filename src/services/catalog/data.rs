use crate::models::{content::UNRATED, ContentItem};

struct Seed {
    id: &'static str,
    title: &'static str,
    genre: &'static str,
    cast: &'static str,
    rating: &'static str,
    platform: &'static str,
    image: &'static str,
    description: &'static str,
    anticipated_release: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "1",
        title: "Alchemy of Souls",
        genre: "Fantasy, Romance",
        cast: "Lee Jae-wook, Jung So-min",
        rating: "8.7",
        platform: "Netflix",
        image: "assets/alchemy.png",
        description: "In a fictional kingdom, a powerful sorceress trapped in a blind woman's body encounters a nobleman with a tragic past.",
        anticipated_release: false,
    },
    Seed {
        id: "2",
        title: "Twenty-Five Twenty-One",
        genre: "Coming-of-age, Sports",
        cast: "Kim Tae-ri, Nam Joo-hyuk",
        rating: "8.9",
        platform: "Netflix",
        image: "assets/2521.png",
        description: "Set during the 1998 financial crisis, a passionate teen fencer and a struggling young man form a deep bond.",
        anticipated_release: false,
    },
    Seed {
        id: "3",
        title: "Extraordinary Attorney Woo",
        genre: "Legal, Slice of Life",
        cast: "Park Eun-bin, Kang Tae-oh",
        rating: "9.0",
        platform: "Netflix",
        image: "assets/woo.png",
        description: "Woo Young-woo, a brilliant rookie attorney with autism, tackles complex legal cases with her unique perspective.",
        anticipated_release: false,
    },
    Seed {
        id: "4",
        title: "My Mister",
        genre: "Drama, Healing",
        cast: "Lee Sun-kyun, IU",
        rating: "9.1",
        platform: "Netflix",
        image: "assets/mister.png",
        description: "A middle-aged engineer and a young woman burdened by debt form an unlikely bond.",
        anticipated_release: false,
    },
    Seed {
        id: "5",
        title: "The Untamed",
        genre: "Xianxia, Mystery",
        cast: "Xiao Zhan, Wang Yibo",
        rating: "8.8",
        platform: "Viki",
        image: "assets/untamed.png",
        description: "In a world of cultivation and ancient clans, two soulmates uncover dark secrets and confront forbidden magic.",
        anticipated_release: false,
    },
    Seed {
        id: "6",
        title: "Genie, Make a Wish",
        genre: "Fantasy, Comedy",
        cast: "Wang Zi Qi, Yukee Chen",
        rating: "7.9",
        platform: "iQIYI",
        image: "assets/genie.png",
        description: "A quirky genie appears to grant wishes to a struggling woman, but chaos and romance ensue.",
        anticipated_release: false,
    },
    Seed {
        id: "7",
        title: "Dear X",
        genre: "Thriller, Noir",
        cast: "Hsieh Ying-xuan, Joseph Huang",
        rating: "8.2",
        platform: "Netflix",
        image: "assets/dearx.png",
        description: "A widow, her son, and her late husband's lover become entangled in a twisted inheritance battle.",
        anticipated_release: false,
    },
    Seed {
        id: "8",
        title: "Squid Game",
        genre: "Survival, Thriller",
        cast: "Lee Jung-jae, Park Hae-soo",
        rating: "8.0",
        platform: "Netflix",
        image: "assets/squid.png",
        description: "Hundreds of desperate contestants risk their lives in deadly children's games for a massive cash prize.",
        anticipated_release: false,
    },
    Seed {
        id: "9",
        title: "Frankenstein",
        genre: "Horror, Classic",
        cast: "Boris Karloff, Colin Clive",
        rating: "7.8",
        platform: "Prime Video",
        image: "assets/frankenstein.png",
        description: "A scientist defies nature by creating life from death, and his monstrous creation spirals into tragedy and terror.",
        anticipated_release: false,
    },
    Seed {
        id: "10",
        title: "Inside Out 2",
        genre: "Animation, Family",
        cast: "Amy Poehler, Maya Hawke",
        rating: "8.5",
        platform: "Disney+",
        image: "assets/insideout2.png",
        description: "As Riley enters her teenage years, new emotions like Anxiety and Envy join the mix.",
        anticipated_release: false,
    },
    Seed {
        id: "11",
        title: "Regretting You",
        genre: "Romance, Family",
        cast: "Fictional adaptation",
        rating: "8.3",
        platform: "CineCloud",
        image: "assets/regretting.png",
        description: "A mother and daughter struggle to reconnect after a tragic accident and hidden secrets.",
        anticipated_release: false,
    },
    Seed {
        id: "12",
        title: "Modern Family",
        genre: "Sitcom, Comedy",
        cast: "Ed O'Neill, Sofía Vergara",
        rating: "8.4",
        platform: "Disney+ Hotstar",
        image: "assets/modernfamily.png",
        description: "Three diverse families hilariously navigate parenting, relationships, and generational clashes.",
        anticipated_release: false,
    },
    Seed {
        id: "201",
        title: "Squid Game 2",
        genre: "Thriller, Survival",
        cast: "Lee Jung-jae, Lee Byung-hun",
        rating: UNRATED,
        platform: "Netflix",
        image: "assets/squidgame2.png",
        description: "The global phenomenon returns with a new game, new contestants, and a deeper dive into the organization behind it.",
        anticipated_release: true,
    },
    Seed {
        id: "202",
        title: "Ask the Stars",
        genre: "Sci-Fi, Rom-Com",
        cast: "Gong Hyo-jin, Lee Min-ho",
        rating: UNRATED,
        platform: "tvN",
        image: "assets/askthestars.png",
        description: "A romantic comedy set on a space station, following an astronaut and the gynecologist who joins her crew.",
        anticipated_release: true,
    },
    Seed {
        id: "203",
        title: "One Piece (S2)",
        genre: "Adventure, Fantasy",
        cast: "Iñaki Godoy, Mackenyu",
        rating: UNRATED,
        platform: "Netflix",
        image: "assets/onepiece2.png",
        description: "The Straw Hat Pirates continue their journey into the Grand Line, facing powerful new enemies.",
        anticipated_release: true,
    },
    Seed {
        id: "204",
        title: "All of Us Are Dead S2",
        genre: "Zombie, Horror",
        cast: "Park Ji-hu, Yoon Chan-young",
        rating: UNRATED,
        platform: "Netflix",
        image: "assets/allofusaredead2.png",
        description: "The survivors face the lasting consequences of the zombie virus outbreak.",
        anticipated_release: true,
    },
    Seed {
        id: "205",
        title: "The White Olive Tree",
        genre: "Military, Romance, Action",
        cast: "Chen Zhe Yuan, Liang Jie",
        rating: UNRATED,
        platform: "iQIYI",
        image: "assets/whiteolivetree.png",
        description: "A military reporter and a bomb disposal engineer meet while covering a peacekeeping mission.",
        anticipated_release: true,
    },
];

/// The bundled catalog: twelve regular titles followed by five featured releases
pub fn sample_items() -> Vec<ContentItem> {
    SEEDS
        .iter()
        .map(|seed| ContentItem {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            genre: seed.genre.to_string(),
            cast: seed.cast.to_string(),
            rating: seed.rating.to_string(),
            platform: seed.platform.to_string(),
            image: seed.image.to_string(),
            description: seed.description.to_string(),
            anticipated_release: seed.anticipated_release,
        })
        .collect()
}
